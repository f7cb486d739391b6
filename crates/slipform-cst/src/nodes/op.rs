// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Operator vocabularies and rendering precedence.

/// Binding strength used when rendering expressions.
///
/// Higher values bind tighter. A sub-expression whose precedence is lower than
/// the minimum its context requires is wrapped in parentheses.
pub mod precedence {
    /// Bare tuples (`a, b`).
    pub const TUPLE: u8 = 0;
    /// Conditional expressions and any single `test`.
    pub const TEST: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const NOT: u8 = 4;
    pub const COMPARISON: u8 = 5;
    pub const BIT_OR: u8 = 6;
    pub const BIT_XOR: u8 = 7;
    pub const BIT_AND: u8 = 8;
    pub const SHIFT: u8 = 9;
    pub const ARITH: u8 = 10;
    pub const TERM: u8 = 11;
    /// Unary `+`, `-` and `~`.
    pub const FACTOR: u8 = 12;
    pub const POWER: u8 = 13;
    /// Calls, attribute access and subscripts.
    pub const PRIMARY: u8 = 15;
    pub const ATOM: u8 = 16;
}

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinaryOp {
    /// Source token for the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mult => "*",
            BinaryOp::MatMult => "@",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
        }
    }

    /// Parse an operator token.
    pub fn from_token(text: &str) -> Option<Self> {
        Some(match text {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mult,
            "@" => BinaryOp::MatMult,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Pow,
            "<<" => BinaryOp::LShift,
            ">>" => BinaryOp::RShift,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&" => BinaryOp::BitAnd,
            _ => return None,
        })
    }

    /// Parse an augmented assignment token such as `+=`.
    pub fn from_augmented_token(text: &str) -> Option<Self> {
        text.strip_suffix('=').and_then(Self::from_token)
    }

    /// Snake-case operation name, as used for graph operations.
    pub fn op_name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mult => "mul",
            BinaryOp::MatMult => "matmul",
            BinaryOp::Div => "truediv",
            BinaryOp::FloorDiv => "floordiv",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "pow",
            BinaryOp::LShift => "lshift",
            BinaryOp::RShift => "rshift",
            BinaryOp::BitOr => "or_",
            BinaryOp::BitXor => "xor",
            BinaryOp::BitAnd => "and_",
        }
    }

    /// Rendering precedence.
    pub fn precedence(&self) -> u8 {
        use precedence::*;
        match self {
            BinaryOp::BitOr => BIT_OR,
            BinaryOp::BitXor => BIT_XOR,
            BinaryOp::BitAnd => BIT_AND,
            BinaryOp::LShift | BinaryOp::RShift => SHIFT,
            BinaryOp::Add | BinaryOp::Sub => ARITH,
            BinaryOp::Mult
            | BinaryOp::MatMult
            | BinaryOp::Div
            | BinaryOp::FloorDiv
            | BinaryOp::Mod => TERM,
            BinaryOp::Pow => POWER,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `~x`
    Invert,
    /// `not x`
    Not,
}

impl UnaryOp {
    /// Source token for the operator, including the space after `not`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not ",
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "pos",
            UnaryOp::Minus => "neg",
            UnaryOp::Invert => "invert",
            UnaryOp::Not => "not_",
        }
    }

    /// Rendering precedence.
    pub fn precedence(&self) -> u8 {
        match self {
            UnaryOp::Not => precedence::NOT,
            _ => precedence::FACTOR,
        }
    }
}

/// Short-circuiting boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BoolOp::And => precedence::AND,
            BoolOp::Or => precedence::OR,
        }
    }
}

/// Comparison operators, including identity and membership tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CompOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompOp::Eq => "==",
            CompOp::NotEq => "!=",
            CompOp::Lt => "<",
            CompOp::LtE => "<=",
            CompOp::Gt => ">",
            CompOp::GtE => ">=",
            CompOp::Is => "is",
            CompOp::IsNot => "is not",
            CompOp::In => "in",
            CompOp::NotIn => "not in",
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            CompOp::Eq => "eq",
            CompOp::NotEq => "ne",
            CompOp::Lt => "lt",
            CompOp::LtE => "le",
            CompOp::Gt => "gt",
            CompOp::GtE => "ge",
            CompOp::Is => "is_",
            CompOp::IsNot => "is_not",
            CompOp::In => "contains",
            CompOp::NotIn => "not_contains",
        }
    }

    /// Parse a single-token comparison operator (`in`, `is`, `<`, ...).
    pub fn from_token(text: &str) -> Option<Self> {
        Some(match text {
            "==" => CompOp::Eq,
            "!=" => CompOp::NotEq,
            "<" => CompOp::Lt,
            "<=" => CompOp::LtE,
            ">" => CompOp::Gt,
            ">=" => CompOp::GtE,
            "is" => CompOp::Is,
            "in" => CompOp::In,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augmented_tokens_map_to_binary_ops() {
        assert_eq!(BinaryOp::from_augmented_token("+="), Some(BinaryOp::Add));
        assert_eq!(BinaryOp::from_augmented_token("//="), Some(BinaryOp::FloorDiv));
        assert_eq!(BinaryOp::from_augmented_token("**="), Some(BinaryOp::Pow));
        assert_eq!(BinaryOp::from_augmented_token("=="), None);
    }

    #[test]
    fn precedence_orders_operators() {
        assert!(BinaryOp::Mult.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Pow.precedence() > UnaryOp::Minus.precedence());
        assert!(BoolOp::And.precedence() > BoolOp::Or.precedence());
        assert!(UnaryOp::Not.precedence() < precedence::COMPARISON);
    }
}
