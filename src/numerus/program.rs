//! Plural rule programs.
//!
//! A rule program selects the plural form for a count. The compiled catalog
//! stores it as a compact byte sequence; in memory it is a list of
//! [`Instruction`]s interpreted by [`RuleProgram::evaluate`].

use thiserror::Error;

pub const Q_EQ: u8 = 0x01;
pub const Q_LT: u8 = 0x02;
pub const Q_LEQ: u8 = 0x03;
pub const Q_BETWEEN: u8 = 0x04;

pub const Q_NOT: u8 = 0x08;
pub const Q_MOD_10: u8 = 0x10;
pub const Q_MOD_100: u8 = 0x20;
pub const Q_LEAD_1000: u8 = 0x40;

pub const Q_AND: u8 = 0xFD;
pub const Q_OR: u8 = 0xFE;
pub const Q_NEWRULE: u8 = 0xFF;

pub const Q_OP_MASK: u8 = 0x07;

pub const Q_NEQ: u8 = Q_NOT | Q_EQ;
pub const Q_GT: u8 = Q_NOT | Q_LEQ;
pub const Q_GEQ: u8 = Q_NOT | Q_LT;
pub const Q_NOT_BETWEEN: u8 = Q_NOT | Q_BETWEEN;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleProgramError {
    #[error("Rule program ends inside an instruction at byte {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("Unknown rule opcode {opcode:#04x} at byte {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("Combinator or rule separator without a preceding comparison at byte {offset}")]
    MisplacedSeparator { offset: usize },

    #[error("Rule program ends with a combinator or rule separator")]
    DanglingSeparator,
}

/// Comparison applied to the (transformed) count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq(u8),
    Lt(u8),
    Leq(u8),
    /// Inclusive range.
    Between(u8, u8),
}

/// Transformation of the count before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    #[default]
    Identity,
    Mod10,
    Mod100,
    /// Leading group of three digits (`1234567` → `1`).
    Lead1000,
}

impl Transform {
    /// Applies the transform to `n`.
    const fn apply(self, n: u64) -> u64 {
        match self {
            Self::Identity => n,
            Self::Mod10 => n % 10,
            Self::Mod100 => n % 100,
            Self::Lead1000 => {
                let mut value = n;
                while value >= 1000 {
                    value /= 1000;
                }
                value
            }
        }
    }

    /// Opcode bits of the transform.
    const fn flag(self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::Mod10 => Q_MOD_10,
            Self::Mod100 => Q_MOD_100,
            Self::Lead1000 => Q_LEAD_1000,
        }
    }
}

/// One decoded step of a rule program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Tests the (transformed) number, optionally negated.
    Compare { comparison: Comparison, transform: Transform, negate: bool },
    /// Combines with the next term; both must hold.
    And,
    /// Combines with the next term; either may hold.
    Or,
    /// Starts the condition of the next form.
    NewRule,
}

impl Instruction {
    /// Result of a comparison for `n`; `false` for combinators.
    fn test(self, n: u64) -> bool {
        let Self::Compare { comparison, transform, negate } = self else {
            return false;
        };
        let value = transform.apply(n);
        let result = match comparison {
            Comparison::Eq(operand) => value == u64::from(operand),
            Comparison::Lt(operand) => value < u64::from(operand),
            Comparison::Leq(operand) => value <= u64::from(operand),
            Comparison::Between(low, high) => {
                value >= u64::from(low) && value <= u64::from(high)
            }
        };
        result != negate
    }
}

/// A decoded plural rule program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleProgram {
    /// Well-formed instruction sequence.
    instructions: Vec<Instruction>,
}

impl RuleProgram {
    /// Decodes the legacy opcode encoding.
    ///
    /// # Errors
    /// Returns an error for truncated instructions, unknown opcodes and
    /// combinators that do not sit between two comparisons.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuleProgramError> {
        let mut instructions = Vec::new();
        let mut offset = 0;
        let mut expect_term = true;

        while let Some(&opcode) = bytes.get(offset) {
            let instruction = match opcode {
                Q_AND | Q_OR | Q_NEWRULE => {
                    if expect_term {
                        return Err(RuleProgramError::MisplacedSeparator { offset });
                    }
                    offset += 1;
                    expect_term = true;
                    match opcode {
                        Q_AND => Instruction::And,
                        Q_OR => Instruction::Or,
                        _ => Instruction::NewRule,
                    }
                }
                _ => {
                    if !expect_term {
                        return Err(RuleProgramError::UnknownOpcode { opcode, offset });
                    }
                    let instruction = Self::decode_compare(bytes, offset)?;
                    offset += if matches!(opcode & Q_OP_MASK, Q_BETWEEN) { 3 } else { 2 };
                    expect_term = false;
                    instruction
                }
            };
            instructions.push(instruction);
        }

        if expect_term && !instructions.is_empty() {
            return Err(RuleProgramError::DanglingSeparator);
        }
        Ok(Self { instructions })
    }

    /// Decodes the comparison starting at `offset`.
    fn decode_compare(bytes: &[u8], offset: usize) -> Result<Instruction, RuleProgramError> {
        let opcode = bytes.get(offset).copied().unwrap_or_default();
        if opcode & 0x80 != 0 {
            return Err(RuleProgramError::UnknownOpcode { opcode, offset });
        }
        let operand = |i: usize| {
            bytes.get(offset + i).copied().ok_or(RuleProgramError::UnexpectedEnd { offset })
        };
        let comparison = match opcode & Q_OP_MASK {
            Q_EQ => Comparison::Eq(operand(1)?),
            Q_LT => Comparison::Lt(operand(1)?),
            Q_LEQ => Comparison::Leq(operand(1)?),
            Q_BETWEEN => Comparison::Between(operand(1)?, operand(2)?),
            _ => return Err(RuleProgramError::UnknownOpcode { opcode, offset }),
        };
        let transform = if opcode & Q_MOD_10 != 0 {
            Transform::Mod10
        } else if opcode & Q_MOD_100 != 0 {
            Transform::Mod100
        } else if opcode & Q_LEAD_1000 != 0 {
            Transform::Lead1000
        } else {
            Transform::Identity
        };
        Ok(Instruction::Compare { comparison, transform, negate: opcode & Q_NOT != 0 })
    }

    /// Encodes back into the legacy opcode bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.instructions.len() * 2);
        for instruction in &self.instructions {
            match *instruction {
                Instruction::Compare { comparison, transform, negate } => {
                    let flags = transform.flag() | if negate { Q_NOT } else { 0 };
                    match comparison {
                        Comparison::Eq(operand) => bytes.extend([flags | Q_EQ, operand]),
                        Comparison::Lt(operand) => bytes.extend([flags | Q_LT, operand]),
                        Comparison::Leq(operand) => bytes.extend([flags | Q_LEQ, operand]),
                        Comparison::Between(low, high) => {
                            bytes.extend([flags | Q_BETWEEN, low, high]);
                        }
                    }
                }
                Instruction::And => bytes.push(Q_AND),
                Instruction::Or => bytes.push(Q_OR),
                Instruction::NewRule => bytes.push(Q_NEWRULE),
            }
        }
        bytes
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of plural forms the program distinguishes.
    ///
    /// Every rule selects one form and the unconditional fallback adds one
    /// more; an empty program has a single universal form.
    #[must_use]
    pub fn form_count(&self) -> usize {
        if self.instructions.is_empty() {
            return 1;
        }
        self.instructions.iter().filter(|i| matches!(i, Instruction::NewRule)).count() + 2
    }

    /// Selects the plural form index for `n`.
    ///
    /// Rules are tried in order; inside a rule the combinators apply strictly
    /// left to right. When no rule matches the fallback form (one past the
    /// last rule) is returned.
    #[must_use]
    pub fn evaluate(&self, n: u64) -> usize {
        if self.instructions.is_empty() {
            return 0;
        }

        let mut form = 0;
        let mut value: Option<bool> = None;
        let mut pending: Option<Instruction> = None;

        for &instruction in &self.instructions {
            match instruction {
                Instruction::Compare { .. } => {
                    let term = instruction.test(n);
                    value = Some(match (value, pending.take()) {
                        (Some(acc), Some(Instruction::And)) => acc && term,
                        (Some(acc), Some(Instruction::Or)) => acc || term,
                        _ => term,
                    });
                }
                Instruction::And | Instruction::Or => pending = Some(instruction),
                Instruction::NewRule => {
                    if value == Some(true) {
                        return form;
                    }
                    form += 1;
                    value = None;
                }
            }
        }

        if value == Some(true) { form } else { form + 1 }
    }
}
