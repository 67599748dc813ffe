use crate::error::CoordinateError;
use parkdist::Coord;

/// Parses a KML `<coordinates>` body.
///
/// Tuples are whitespace separated, each `lon,lat` with an optional
/// altitude. Longitude maps to `x`, latitude to `y`; altitude is checked
/// but dropped.
pub fn parse_coordinates(text: &str) -> Result<Vec<Coord>, CoordinateError> {
    let coords = text
        .split_whitespace()
        .map(parse_tuple)
        .collect::<Result<Vec<_>, _>>()?;
    if coords.is_empty() {
        return Err(CoordinateError::Empty);
    }
    Ok(coords)
}

fn parse_tuple(tuple: &str) -> Result<Coord, CoordinateError> {
    let parts: Vec<&str> = tuple.split(',').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(CoordinateError::MalformedTuple {
            tuple: tuple.to_string(),
        });
    }

    let number = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateError::InvalidNumber {
                tuple: tuple.to_string(),
                value: value.to_string(),
            })
    };

    let lon = number(parts[0])?;
    let lat = number(parts[1])?;
    if let Some(alt) = parts.get(2) {
        number(alt)?;
    }
    Ok(Coord { x: lon, y: lat })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tuples_with_and_without_altitude() {
        let coords = parse_coordinates(
            "
            -122.5,37.7,0
            -122.4,37.8
            ",
        )
        .unwrap();
        assert_eq!(
            coords,
            vec![
                Coord { x: -122.5, y: 37.7 },
                Coord { x: -122.4, y: 37.8 },
            ]
        );
    }

    #[test]
    fn rejects_empty_body() {
        assert_eq!(parse_coordinates("  \n\t "), Err(CoordinateError::Empty));
    }

    #[test]
    fn rejects_bad_tuples() {
        assert!(matches!(
            parse_coordinates("1.0"),
            Err(CoordinateError::MalformedTuple { .. })
        ));
        assert!(matches!(
            parse_coordinates("1,2,3,4"),
            Err(CoordinateError::MalformedTuple { .. })
        ));
        assert_eq!(
            parse_coordinates("1.0,north"),
            Err(CoordinateError::InvalidNumber {
                tuple: "1.0,north".to_string(),
                value: "north".to_string(),
            })
        );
    }
}
