//! The `.ckt` circuit file format: one `key = value` pair per line.
//!
//! ```text
//! name = Patatoid
//! gridSize = 10
//! maximumSpeed = 6
//! numLaps = 1
//! startingLine = 226,236,100,236
//! innerBorder = 217,95,275,110,...
//! outerBorder = 323,44,363,76,...
//! ```

use std::fmt;

/// Parsed contents of one `.ckt` file, ready to build a
/// [`crate::circuit::Circuit`] from.
#[derive(Debug, Clone)]
pub struct CircuitData {
    pub name: String,
    pub grid_size: f64,
    pub maximum_speed: f64,
    pub num_laps: u32,
    /// `[x1, y1, x2, y2]`.
    pub starting_line: [i64; 4],
    /// Flat `[x1, y1, x2, y2, ...]` list, closed implicitly.
    pub inner_border: Vec<i64>,
    /// Flat `[x1, y1, x2, y2, ...]` list, closed implicitly.
    pub outer_border: Vec<i64>,
}

/// Errors raised while parsing a `.ckt` file.
#[derive(Debug)]
pub enum FormatError {
    MissingField(&'static str),
    BadInteger(String),
    BadCoordinateList(&'static str),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingField(name) => write!(f, "missing required field '{}'", name),
            FormatError::BadInteger(v) => write!(f, "expected integer, got '{}'", v),
            FormatError::BadCoordinateList(name) => write!(f, "'{}' must be a comma-separated integer list", name),
        }
    }
}

impl std::error::Error for FormatError {}

/// Parses one `.ckt` file's contents into a [`CircuitData`].
pub fn parse_circuit_file(contents: &str) -> Result<CircuitData, FormatError> {
    let mut fields = std::collections::HashMap::new();
    for line in contents.lines() {
        if let Some((key, value)) = line.split_once(" = ") {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    let get = |key: &'static str| fields.get(key).cloned().ok_or(FormatError::MissingField(key));
    let parse_int_list = |key: &'static str, s: &str| -> Result<Vec<i64>, FormatError> {
        s.split(',')
            .map(|n| n.trim().parse::<i64>().map_err(|_| FormatError::BadCoordinateList(key)))
            .collect()
    };

    let name = get("name")?;
    let grid_size = fields
        .get("gridSize")
        .map(|v| v.parse::<f64>().map_err(|_| FormatError::BadInteger(v.clone())))
        .transpose()?
        .unwrap_or(10.0);
    let maximum_speed = get("maximumSpeed")?
        .parse::<f64>()
        .map_err(|e| FormatError::BadInteger(e.to_string()))?;
    let num_laps = fields
        .get("numLaps")
        .map(|v| v.parse::<u32>().map_err(|_| FormatError::BadInteger(v.clone())))
        .transpose()?
        .unwrap_or(1);
    let starting_line = parse_int_list("startingLine", &get("startingLine")?)?;
    if starting_line.len() != 4 {
        return Err(FormatError::BadCoordinateList("startingLine"));
    }
    let inner_border = parse_int_list("innerBorder", &get("innerBorder")?)?;
    let outer_border = parse_int_list("outerBorder", &get("outerBorder")?)?;

    Ok(CircuitData {
        name,
        grid_size,
        maximum_speed,
        num_laps,
        starting_line: [starting_line[0], starting_line[1], starting_line[2], starting_line[3]],
        inner_border,
        outer_border,
    })
}

/// A built-in circuit so the crate is usable without a circuit directory
/// on disk.
pub fn patatoid() -> CircuitData {
    CircuitData {
        name: "Patatoid".to_string(),
        grid_size: 10.0,
        maximum_speed: 6.0,
        num_laps: 1,
        starting_line: [226, 236, 100, 236],
        inner_border: vec![
            217, 95, 275, 110, 319, 120, 331, 153, 335, 191, 331, 236, 292, 295, 265, 316, 230, 320, 193, 316, 173,
            288, 167, 272, 186, 236, 219, 208, 232, 185, 269, 116,
        ],
        outer_border: vec![
            323, 44, 363, 76, 399, 79, 427, 93, 445, 126, 447, 185, 442, 245, 369, 324, 301, 356, 227, 357, 175, 355,
            141, 320, 117, 289, 122, 254, 154, 148, 217, 158, 154, 141, 182, 71, 225, 41, 279, 32,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_file() {
        let text = "name = Test\nmaximumSpeed = 6\nstartingLine = 0,0,1,0\ninnerBorder = 1,1,1,2,2,2\nouterBorder = 0,0,0,5,5,5,5,0\n";
        let data = parse_circuit_file(text).unwrap();
        assert_eq!(data.name, "Test");
        assert_eq!(data.grid_size, 10.0);
        assert_eq!(data.num_laps, 1);
        assert_eq!(data.starting_line, [0, 0, 1, 0]);
    }

    #[test]
    fn missing_field_is_an_error() {
        let text = "name = Test\n";
        assert!(matches!(parse_circuit_file(text), Err(FormatError::MissingField("maximumSpeed"))));
    }

    #[test]
    fn patatoid_is_well_formed() {
        let data = patatoid();
        assert_eq!(data.inner_border.len() % 2, 0);
        assert_eq!(data.outer_border.len() % 2, 0);
    }
}
