//! Stored procedure declarations and their MySQL creation statements.

/// Direction of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
}

impl ParamDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ParamDirection::In => "IN",
            ParamDirection::Out => "OUT",
            ParamDirection::InOut => "INOUT",
        }
    }
}

/// A parameter in a stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcParam {
    pub name: String,
    pub sql_type: String,
    pub direction: ParamDirection,
}

impl ProcParam {
    /// The representation of the parameter in SQL.
    pub fn sql(&self) -> String {
        format!("{} {} {}", self.direction.as_sql(), self.name, self.sql_type)
    }
}

/// A SQL stored procedure declared in the model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProcedure {
    pub name: String,
    pub comment: Option<String>,
    pub params: Vec<ProcParam>,
    pub body: String,
}

impl StoredProcedure {
    /// MySQL statement of procedure creation based on the current definition.
    pub fn sql(&self) -> String {
        let mut statement = format!("CREATE OR REPLACE PROCEDURE {}(", self.name);
        if !self.params.is_empty() {
            let params_text = self
                .params
                .iter()
                .map(ProcParam::sql)
                .collect::<Vec<_>>()
                .join(",\n");
            statement.push('\n');
            statement.push_str(&indent(&params_text));
            statement.push('\n');
        }
        statement.push_str(")\nLANGUAGE SQL");
        if let Some(comment) = &self.comment {
            statement.push_str(&format!("\nCOMMENT '{comment}'"));
        }
        let body = indent(dedent(&self.body).trim_matches('\n'));
        statement.push_str(&format!("\nBEGIN\n{body}\nEND\n"));
        statement
    }

    /// The creation statement wrapped in a delimiter change, so the
    /// procedure body's semicolons survive in a batch script.
    pub fn creation_statement(&self) -> String {
        format!("DELIMITER //\n{}\n//\nDELIMITER ;", self.sql())
    }
}

/// Prefix every non-empty line with four spaces.
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove the longest common leading whitespace from all non-empty lines.
fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| if line.len() >= margin { &line[margin..] } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
