use glam::DVec3;

/// Errors from parsing or applying trajectory opcodes. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("line {line}: {opcode} expects {expected} operands, got {found}")]
    Arity {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: bad operand {operand:?} for {opcode}")]
    BadOperand {
        line: usize,
        opcode: &'static str,
        operand: String,
    },
    #[error("line {line}: {opcode} before START")]
    NotStarted { line: usize, opcode: &'static str },
    #[error("line {line}: END move count {moves} must be a finite non-negative number")]
    InvalidMoves { line: usize, moves: f64 },
}

impl PathError {
    /// Line the error was reported on.
    pub fn line(&self) -> usize {
        match self {
            PathError::Arity { line, .. }
            | PathError::BadOperand { line, .. }
            | PathError::NotStarted { line, .. }
            | PathError::InvalidMoves { line, .. } => *line,
        }
    }
}

/// One trajectory instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Opcode {
    /// Reset to an absolute grid position with zero velocity.
    Start(DVec3),
    /// Add to the velocity, then advance by it. `VEC` is a legacy alias.
    Acc(DVec3),
    /// Stop after `moves` (possibly fractional) moves.
    End { ok: bool, moves: f64 },
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Start(_) => "START",
            Opcode::Acc(_) => "ACC",
            Opcode::End { .. } => "END",
        }
    }
}

/// Parse one line as an opcode. Lines that do not start with an opcode
/// keyword yield `Ok(None)`.
pub fn parse_opcode(line_no: usize, line: &str) -> Result<Option<Opcode>, PathError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let operands: Vec<&str> = words.collect();
    let op = match keyword {
        "START" => Opcode::Start(vector(line_no, "START", &operands)?),
        "ACC" => Opcode::Acc(vector(line_no, "ACC", &operands)?),
        "VEC" => Opcode::Acc(vector(line_no, "VEC", &operands)?),
        "END" => {
            arity(line_no, "END", &operands, 2)?;
            let moves = number(line_no, "END", operands[1])?;
            Opcode::End {
                ok: operands[0] == "OK",
                moves,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(op))
}

fn arity(line: usize, opcode: &'static str, operands: &[&str], expected: usize) -> Result<(), PathError> {
    if operands.len() != expected {
        return Err(PathError::Arity {
            line,
            opcode,
            expected,
            found: operands.len(),
        });
    }
    Ok(())
}

fn number(line: usize, opcode: &'static str, operand: &str) -> Result<f64, PathError> {
    operand
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PathError::BadOperand {
            line,
            opcode,
            operand: operand.to_string(),
        })
}

fn vector(line: usize, opcode: &'static str, operands: &[&str]) -> Result<DVec3, PathError> {
    arity(line, opcode, operands, 3)?;
    Ok(DVec3::new(
        number(line, opcode, operands[0])?,
        number(line, opcode, operands[1])?,
        number(line, opcode, operands[2])?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_opcode() {
        assert_eq!(
            parse_opcode(1, "START 2 1 2").unwrap(),
            Some(Opcode::Start(DVec3::new(2.0, 1.0, 2.0)))
        );
        assert_eq!(
            parse_opcode(2, "ACC -1 0 1").unwrap(),
            Some(Opcode::Acc(DVec3::new(-1.0, 0.0, 1.0)))
        );
        assert_eq!(
            parse_opcode(3, "VEC 0 0 1").unwrap(),
            Some(Opcode::Acc(DVec3::new(0.0, 0.0, 1.0)))
        );
        assert_eq!(
            parse_opcode(4, "END OK 5.5").unwrap(),
            Some(Opcode::End { ok: true, moves: 5.5 })
        );
        assert_eq!(
            parse_opcode(5, "END NOK 0").unwrap(),
            Some(Opcode::End { ok: false, moves: 0.0 })
        );
    }

    #[test]
    fn non_opcode_lines() {
        assert_eq!(parse_opcode(1, "").unwrap(), None);
        assert_eq!(parse_opcode(1, "   ").unwrap(), None);
        assert_eq!(parse_opcode(1, "TITLE hello").unwrap(), None);
        assert_eq!(parse_opcode(1, "ENDMAP").unwrap(), None);
    }

    #[test]
    fn operand_errors_carry_line() {
        let err = parse_opcode(7, "ACC 1 x 0").unwrap_err();
        assert_eq!(
            err,
            PathError::BadOperand {
                line: 7,
                opcode: "ACC",
                operand: "x".into()
            }
        );
        let err = parse_opcode(9, "START 1 2").unwrap_err();
        assert!(matches!(err, PathError::Arity { expected: 3, found: 2, .. }));
        assert_eq!(err.line(), 9);
        assert!(parse_opcode(1, "END OK inf").is_err());
    }
}
