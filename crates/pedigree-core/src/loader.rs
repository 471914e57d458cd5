use crate::error::{Error, Result};
use crate::model::{Person, Sex};
use rustc_hash::FxHashSet;

/// Separator for list-valued cells (`children`, `parents`) in the delimited
/// tabular form.
pub const LIST_SEPARATOR: char = ';';

/// Parse a list-of-records JSON document (the shape of `family.json`).
pub fn parse_json(text: &str) -> Result<Vec<Person>> {
    let persons: Vec<Person> = serde_json::from_str(text)?;
    validate(&persons)?;
    Ok(persons)
}

/// Parse the delimited tabular form: one header line naming camelCase
/// columns, one record per following line. List-valued cells are
/// `;`-joined, booleans are literal `true`/`false` tokens, blank cells mean
/// absent.
pub fn parse_delimited(text: &str, delimiter: char) -> Result<Vec<Person>> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((header_no, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns: Vec<&str> = header.split(delimiter).map(str::trim).collect();
    for col in &columns {
        if !is_known_column(col) {
            tracing::warn!(line = header_no + 1, column = %col, "unknown column, values ignored");
        }
    }

    let mut persons: Vec<Person> = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if cells.len() > columns.len() {
            return Err(Error::MalformedRecord {
                line: line_no,
                message: format!(
                    "{} cells but only {} header columns",
                    cells.len(),
                    columns.len()
                ),
            });
        }
        persons.push(record_from_cells(&columns, &cells, line_no)?);
    }

    validate(&persons)?;
    Ok(persons)
}

fn is_known_column(name: &str) -> bool {
    matches!(
        name,
        "id" | "firstName"
            | "lastName"
            | "dob"
            | "dod"
            | "sex"
            | "spouse"
            | "parents"
            | "children"
            | "married"
            | "picture"
            | "notes"
    )
}

fn record_from_cells(columns: &[&str], cells: &[&str], line_no: usize) -> Result<Person> {
    let mut id: Option<String> = None;
    let mut person = Person {
        id: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        dob: None,
        dod: None,
        sex: None,
        spouse: None,
        parents: Vec::new(),
        children: Vec::new(),
        married: false,
        picture: None,
        notes: None,
    };

    for (col, cell) in columns.iter().zip(cells.iter()) {
        if cell.is_empty() {
            continue;
        }
        match *col {
            "id" => id = Some(cell.to_string()),
            "firstName" => person.first_name = cell.to_string(),
            "lastName" => person.last_name = cell.to_string(),
            "dob" => person.dob = Some(cell.to_string()),
            "dod" => person.dod = Some(cell.to_string()),
            "sex" => person.sex = Sex::from_token(cell),
            "spouse" => person.spouse = Some(cell.to_string()),
            "parents" => person.parents = split_list(cell),
            "children" => person.children = split_list(cell),
            "married" => {
                person.married = match cell.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(Error::MalformedRecord {
                            line: line_no,
                            message: format!("married must be true or false, got {other:?}"),
                        });
                    }
                }
            }
            "picture" => person.picture = Some(cell.to_string()),
            "notes" => person.notes = Some(cell.to_string()),
            _ => {}
        }
    }

    let Some(id) = id else {
        return Err(Error::MalformedRecord {
            line: line_no,
            message: "missing id".to_string(),
        });
    };
    person.id = id;
    Ok(person)
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Dataset-level checks shared by both loaders. Duplicate ids are fatal;
/// odd-looking dates are only warned about since sibling ordering is lexical
/// either way.
fn validate(persons: &[Person]) -> Result<()> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for person in persons {
        if !seen.insert(person.id.as_str()) {
            return Err(Error::DuplicateId {
                id: person.id.clone(),
            });
        }
        for (field, value) in [("dob", &person.dob), ("dod", &person.dod)] {
            if let Some(value) = value {
                if chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    tracing::warn!(id = %person.id, field, value = %value, "date is not ISO YYYY-MM-DD");
                }
            }
        }
    }
    Ok(())
}
