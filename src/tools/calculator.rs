use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolError, ToolExecutor};
use crate::types::Tool;

/// Binary arithmetic over two numbers `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Operation::Add => "Add two numbers together",
            Operation::Subtract => "Subtract the second number from the first number",
            Operation::Multiply => "Multiply two numbers together",
            Operation::Divide => "Divide the first number by the second number",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    fn apply(self, a: f64, b: f64) -> String {
        let result = match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b == 0.0 {
                    tracing::debug!(a, b, "Division by zero requested");
                    return "Error: Cannot divide by zero".to_string();
                }
                a / b
            }
        };
        tracing::debug!(op = self.name(), a, b, result, "Computed result");
        format!("Result: {}", fixed_two_places(result))
    }
}

/// Renders `value` with two decimals, rounding half up from its shortest
/// decimal form, so `0.125` becomes `0.13`. Non-finite values are spelled
/// `Infinity`, `-Infinity` and `NaN`.
fn fixed_two_places(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}Infinity");
    }

    let shortest = value.abs().to_string();
    let (whole, fraction) = shortest
        .split_once('.')
        .unwrap_or((shortest.as_str(), ""));
    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if fraction.as_bytes().get(2).is_some_and(|&d| d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let render = |ds: &[u8]| ds.iter().map(|&d| char::from(b'0' + d)).collect::<String>();
    format!("{sign}{}.{}", render(&digits[..split]), render(&digits[split..]))
}

/// The calculator tool set: `add`, `subtract`, `multiply` and `divide`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Input schema shared by every operation.
    fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "First number" },
                "b": { "type": "number", "description": "Second number" }
            },
            "required": ["a", "b"]
        })
    }

    fn operand(arguments: &Value, key: &str) -> Result<f64, ToolError> {
        match arguments.get(key) {
            Some(value) => value.as_f64().ok_or_else(|| {
                ToolError::InvalidArgument(format!("Argument '{key}' must be a number"))
            }),
            None => Err(ToolError::InvalidArgument(format!(
                "Missing required argument '{key}'"
            ))),
        }
    }
}

#[async_trait]
impl ToolExecutor for Calculator {
    fn tools(&self) -> Vec<Tool> {
        Operation::ALL
            .into_iter()
            .map(|op| Tool {
                name: op.name().to_string(),
                description: op.description().to_string(),
                input_schema: Self::input_schema(),
            })
            .collect()
    }

    async fn execute(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let op = Operation::from_name(name)
            .ok_or_else(|| ToolError::InvalidArgument(format!("Unknown tool: {name}")))?;
        let a = Self::operand(arguments, "a")?;
        let b = Self::operand(arguments, "b")?;
        Ok(op.apply(a, b))
    }
}
