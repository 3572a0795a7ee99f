use std::{fmt, fs, io::Read, path::Path};

use crate::{Error, Result, point::Point};

/// Points loaded for one planning run.
#[derive(Clone, Debug)]
pub struct PlannerInput {
    pub(crate) points: Vec<Point>,
}

impl PlannerInput {
    pub fn new(points: &[Point]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Reads from `path`, or stdin when `None`.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let raw = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::invalid_input(format!("failed to read input {}: {e}", path.display()))
            })?,
            None => {
                let mut raw = String::new();
                std::io::stdin().read_to_string(&mut raw)?;
                raw
            }
        };
        Ok(Self {
            points: parse_points(&raw)?,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn n(&self) -> usize {
        self.points.len()
    }
}

impl fmt::Display for PlannerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n\tpoints = {}", self.points.len())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TokenShape {
    // `x,y`; the id is the zero-based token index.
    Implicit,
    // `id,x,y`
    Explicit,
}

/// Parses whitespace separated `id,x,y` or `x,y` tokens. All tokens must use
/// the same shape.
pub fn parse_points(input: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    let mut shape: Option<TokenShape> = None;

    for (idx, tok) in input.split_whitespace().enumerate() {
        let fields: Vec<&str> = tok.split(',').collect();
        let token_shape = match fields.len() {
            2 => TokenShape::Implicit,
            3 => TokenShape::Explicit,
            _ => {
                return Err(Error::invalid_input(format!(
                    "Token {}: expected 'x,y' or 'id,x,y' but got: {tok}",
                    idx + 1
                )));
            }
        };

        match shape {
            None => shape = Some(token_shape),
            Some(expected) if expected != token_shape => {
                return Err(Error::invalid_input(format!(
                    "Token {}: mixes 'x,y' and 'id,x,y' forms: {tok}",
                    idx + 1
                )));
            }
            Some(_) => {}
        }

        let (id, x_s, y_s) = match token_shape {
            TokenShape::Implicit => (idx as u64, fields[0], fields[1]),
            TokenShape::Explicit => {
                let id = fields[0].parse::<u64>().map_err(|_| {
                    Error::invalid_input(format!("Token {}: invalid id: {}", idx + 1, fields[0]))
                })?;
                (id, fields[1], fields[2])
            }
        };

        let x: f64 = x_s.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid x: {x_s}", idx + 1))
        })?;
        let y: f64 = y_s.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid y: {y_s}", idx + 1))
        })?;

        points.push(Point::new(id, x, y));
    }

    if points.is_empty() {
        return Err(Error::EmptyInput);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::{PlannerInput, parse_points};
    use crate::Error;

    #[test]
    fn implicit_ids_follow_token_index() {
        let points = parse_points("1.0,2.0\n3.0,4.0 5.0,6.0").expect("parse points");
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].id, 0);
        assert_eq!(points[2].id, 2);
        assert_eq!(points[2].to_string(), "2,5.0,6.0");
    }

    #[test]
    fn explicit_ids_are_kept() {
        let points = parse_points("17,100.5,-3\n4,0,0").expect("parse points");
        assert_eq!(points[0].id, 17);
        assert_eq!(points[0].x, 100.5);
        assert_eq!(points[1].id, 4);
    }

    #[test]
    fn empty_input_is_empty_input_error() {
        let err = parse_points(" \n\t ").expect_err("empty input should fail");
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = parse_points("1,2 3,4,5").expect_err("mixed forms should fail");
        assert!(err.to_string().contains("mixes"));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let err = parse_points("1,2,3,4").expect_err("extra fields should fail");
        assert!(err.to_string().contains("expected 'x,y' or 'id,x,y'"));
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let err = parse_points("a,2").expect_err("invalid x should fail");
        assert!(err.to_string().contains("invalid x"));

        let err = parse_points("-1,2,3").expect_err("negative id should fail");
        assert!(err.to_string().contains("invalid id"));
    }

    #[test]
    fn nan_parses_and_is_left_for_validation() {
        let points = parse_points("NaN,1").expect("parse points");
        assert!(points[0].x.is_nan());
    }

    #[test]
    fn display_reports_point_count() {
        let input = PlannerInput::new(&parse_points("0,0 1,1").expect("parse points"));
        assert_eq!(input.n(), 2);
        assert!(input.to_string().contains("points = 2"));
    }
}
