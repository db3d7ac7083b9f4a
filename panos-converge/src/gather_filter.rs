//! Selection of objects for `state=gathered`.
//!
//! A filter is `*` or clauses of the form `field OP value` joined by `and`
//! and `or`, where `and` binds tighter. Values are quoted strings, integers
//! or `true`/`false`, and are converted to the field's type when parsed.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use crate::error::SchemaError;
use crate::object::{ConfigObject, ObjectSpec};
use crate::value::{ParamType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl Clause {
    fn matches(&self, obj: &ConfigObject) -> bool {
        let actual = if self.field == "name" {
            obj.name().map(Value::str).unwrap_or_default()
        } else {
            obj.get(&self.field).clone()
        };

        let ordering = match (&actual, &self.value) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) if matches!(self.op, CompareOp::Eq | CompareOp::Ne) => {
                a.cmp(b)
            }
            // Absent or mismatched values only satisfy `!=`.
            _ => return self.op == CompareOp::Ne,
        };
        self.op.holds(ordering)
    }
}

/// Parsed filter in disjunctive normal form: any group whose clauses all
/// hold selects the object.
#[derive(Debug, Clone, PartialEq)]
pub struct GatherFilter {
    groups: Vec<Vec<Clause>>,
}

impl GatherFilter {
    /// Parse `text` against the fields of `spec`.
    pub fn parse(text: &str, spec: &ObjectSpec) -> Result<Self, SchemaError> {
        let tokens = tokenize(text)?;
        let mut groups = vec![Vec::new()];
        let mut rest = tokens.as_slice();

        loop {
            let (clause, tail) = parse_clause(rest, spec)?;
            if let Some(group) = groups.last_mut() {
                group.push(clause);
            }
            match tail.split_first() {
                None => break,
                Some((Token::Word(word), tail)) if word == "and" => rest = tail,
                Some((Token::Word(word), tail)) if word == "or" => {
                    groups.push(Vec::new());
                    rest = tail;
                }
                Some((token, _)) => {
                    return Err(invalid(format!("expected 'and' or 'or', found {token}")));
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn matches(&self, obj: &ConfigObject) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|clause| clause.matches(obj)))
    }
}

/// Which instances a gather returns.
#[derive(Debug, Clone, PartialEq)]
pub enum GatherQuery {
    All,
    Name(String),
    Filter(GatherFilter),
}

impl GatherQuery {
    /// Resolve the query from the `gathered_filter` and `name` options.
    pub fn from_options(
        filter: Option<&str>,
        name: Option<&str>,
        spec: &ObjectSpec,
    ) -> Result<Self, SchemaError> {
        match (filter.map(str::trim), name) {
            (Some("*"), _) => Ok(GatherQuery::All),
            (Some(text), _) => GatherFilter::parse(text, spec).map(GatherQuery::Filter),
            (None, Some(name)) => Ok(GatherQuery::Name(name.to_string())),
            (None, None) => Ok(GatherQuery::All),
        }
    }

    pub fn matches(&self, obj: &ConfigObject) -> bool {
        match self {
            GatherQuery::All => true,
            GatherQuery::Name(name) => obj.name() == Some(name.as_str()),
            GatherQuery::Filter(filter) => filter.matches(obj),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Op(CompareOp),
    Quoted(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "'{word}'"),
            Token::Op(op) => write!(f, "'{op}'"),
            Token::Quoted(text) => write!(f, "{text:?}"),
        }
    }
}

fn invalid(message: String) -> SchemaError {
    SchemaError::InvalidFilter(message)
}

fn tokenize(text: &str) -> Result<Vec<Token>, SchemaError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut quoted = String::new();
            loop {
                match chars.next() {
                    Some(q) if q == c => break,
                    Some(other) => quoted.push(other),
                    None => return Err(invalid(format!("unterminated string in {text:?}"))),
                }
            }
            tokens.push(Token::Quoted(quoted));
        } else if matches!(c, '=' | '!' | '<' | '>') {
            let mut op = String::new();
            while let Some(&next) = chars.peek() {
                if !matches!(next, '=' | '!' | '<' | '>') {
                    break;
                }
                op.push(next);
                chars.next();
            }
            let parsed =
                CompareOp::parse(&op).ok_or_else(|| invalid(format!("unknown operator {op:?}")))?;
            tokens.push(Token::Op(parsed));
        } else {
            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() || matches!(next, '=' | '!' | '<' | '>' | '"' | '\'') {
                    break;
                }
                word.push(next);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    if tokens.is_empty() {
        return Err(invalid("filter is empty".to_string()));
    }
    Ok(tokens)
}

fn parse_clause<'a>(
    tokens: &'a [Token],
    spec: &ObjectSpec,
) -> Result<(Clause, &'a [Token]), SchemaError> {
    let [Token::Word(field), Token::Op(op), literal, rest @ ..] = tokens else {
        return Err(invalid("expected a clause like \"field == value\"".to_string()));
    };

    let ty = field_type(field, spec)
        .ok_or_else(|| invalid(format!("{} has no field {field}", spec.kind)))?;

    let raw = match literal {
        Token::Quoted(text) => Value::str(text.as_str()),
        Token::Word(word) if word == "true" => Value::Bool(true),
        Token::Word(word) if word == "false" => Value::Bool(false),
        Token::Word(word) => match word.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => return Err(invalid(format!("cannot read value {word:?}"))),
        },
        Token::Op(op) => return Err(invalid(format!("unexpected operator '{op}'"))),
    };
    let value = raw
        .coerce(ty)
        .map_err(|found| invalid(format!("{field} is {ty}, cannot compare with {found}")))?;

    Ok((
        Clause {
            field: field.clone(),
            op: *op,
            value,
        },
        rest,
    ))
}

fn field_type(field: &str, spec: &ObjectSpec) -> Option<ParamType> {
    if field == "name" && spec.is_named() {
        return Some(ParamType::Str);
    }
    spec.field(field).map(|f| f.ty)
}
