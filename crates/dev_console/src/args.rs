use console_contract::{CommandFault, ParamKind, Value, Vector2, Vector3, Vector4};

/// Borrowed argument list handed to a command body.
///
/// Accessors check the value type and turn mismatches into a [`CommandFault`], which the call
/// site reports as an invocation fault.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Wraps an evaluated argument list.
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All arguments in call order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Argument at `index` of any type.
    pub fn value(&self, index: usize) -> Result<&'a Value, CommandFault> {
        self.values
            .get(index)
            .ok_or_else(|| CommandFault::new(format!("missing argument {index}")))
    }

    /// Integer argument.
    pub fn int(&self, index: usize) -> Result<i64, CommandFault> {
        match self.value(index)? {
            Value::Int(value) => Ok(*value),
            other => Err(CommandFault::type_mismatch(index, ParamKind::Int, other)),
        }
    }

    /// Float argument; integers are widened.
    pub fn float(&self, index: usize) -> Result<f64, CommandFault> {
        let value = self.value(index)?;
        value
            .as_float()
            .ok_or_else(|| CommandFault::type_mismatch(index, ParamKind::Float, value))
    }

    /// Text argument.
    pub fn text(&self, index: usize) -> Result<&'a str, CommandFault> {
        match self.value(index)? {
            Value::Text(text) => Ok(text),
            other => Err(CommandFault::type_mismatch(index, ParamKind::Text, other)),
        }
    }

    /// Two-component vector argument.
    pub fn vector2(&self, index: usize) -> Result<Vector2, CommandFault> {
        match self.value(index)? {
            Value::Vector2(vector) => Ok(*vector),
            other => Err(CommandFault::type_mismatch(index, ParamKind::Vector2, other)),
        }
    }

    /// Three-component vector argument.
    pub fn vector3(&self, index: usize) -> Result<Vector3, CommandFault> {
        match self.value(index)? {
            Value::Vector3(vector) => Ok(*vector),
            other => Err(CommandFault::type_mismatch(index, ParamKind::Vector3, other)),
        }
    }

    /// Four-component vector argument.
    pub fn vector4(&self, index: usize) -> Result<Vector4, CommandFault> {
        match self.value(index)? {
            Value::Vector4(vector) => Ok(*vector),
            other => Err(CommandFault::type_mismatch(index, ParamKind::Vector4, other)),
        }
    }
}
