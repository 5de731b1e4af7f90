use anyhow::{bail, Context, Result};
use utfstream_core::RegisterBus;

/// A register session script.
///
/// One step per line; `#` starts a comment and blank lines are skipped.
///
/// ```text
/// w <reg> <value>   write a register
/// r <reg>           read a register and log the value
/// x <reg> <value>   read a register and fail unless it matches
/// ```
///
/// Numbers are decimal or `0x` hex.
#[derive(Debug)]
pub struct Session {
    steps: Vec<Step>,
}

#[derive(Debug)]
struct Step {
    line: usize,
    op: Op,
}

#[derive(Debug)]
enum Op {
    Write { register: u8, value: u8 },
    Read { register: u8 },
    Expect { register: u8, value: u8 },
}

impl Session {
    pub fn parse(source: &str) -> Result<Session> {
        let mut steps = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or(raw).trim();
            if text.is_empty() {
                continue;
            }
            let fields: Vec<&str> = text.split_whitespace().collect();
            let op = match fields.as_slice() {
                ["w", register, value] => Op::Write {
                    register: parse_number(register, line)?,
                    value: parse_number(value, line)?,
                },
                ["r", register] => Op::Read {
                    register: parse_number(register, line)?,
                },
                ["x", register, value] => Op::Expect {
                    register: parse_number(register, line)?,
                    value: parse_number(value, line)?,
                },
                _ => bail!("line {}: unrecognized step '{}'", line, text),
            };
            steps.push(Step { line, op });
        }
        Ok(Session { steps })
    }

    /// Replays the session against a register bus. Expectation steps stop
    /// the run on the first mismatch.
    pub fn run(&self, bus: &mut impl RegisterBus) -> Result<()> {
        log::info!("running {} steps", self.steps.len());
        for step in &self.steps {
            match step.op {
                Op::Write { register, value } => bus.write_reg(register, value),
                Op::Read { register } => {
                    let value = bus.read_reg(register);
                    log::info!("reg {} -> 0x{:02X}", register, value);
                }
                Op::Expect { register, value } => {
                    let got = bus.read_reg(register);
                    if got != value {
                        bail!(
                            "line {}: reg {} read 0x{:02X}, expected 0x{:02X}",
                            step.line,
                            register,
                            got,
                            value
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

fn parse_number(token: &str, line: usize) -> Result<u8> {
    let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        token.parse()
    };
    parsed.with_context(|| format!("line {}: bad number '{}'", line, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utfstream_core::StreamPeripheral;

    #[test]
    fn skips_comments_and_accepts_both_number_bases() {
        let session = Session::parse(
            "# a comment\n\
             w 0 0x6E   # trailing comment\n\
             \n\
             r 4\n\
             x 0 239\n",
        )
        .unwrap();
        assert_eq!(session.steps.len(), 3);
    }

    #[test]
    fn malformed_steps_report_their_line() {
        let err = Session::parse("w 0 0xFF\nq 1 2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = Session::parse("w 0\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));

        let err = Session::parse("r zero\n").unwrap_err();
        assert!(err.to_string().contains("bad number"));
    }

    #[test]
    fn values_past_a_byte_are_rejected() {
        let err = Session::parse("w 1 256\n").unwrap_err();
        assert!(err.to_string().contains("bad number"));
    }

    #[test]
    fn steps_drive_a_peripheral() {
        let session = Session::parse(
            "w 1 0x55\n\
             r 4\n\
             w 0 0xFF\n\
             x 1 0x55\n\
             x 1 0\n",
        )
        .unwrap();
        let mut dev = StreamPeripheral::new();
        session.run(&mut dev).unwrap();
    }

    #[test]
    fn expectation_mismatch_names_the_line() {
        let session = Session::parse("w 1 1\nx 4 0x09\n").unwrap();
        let mut dev = StreamPeripheral::new();
        let err = session.run(&mut dev).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    /// The bundled smoke session carries its own expectations, so a clean
    /// run checks the shipped asset against the model end to end.
    #[test]
    fn bundled_smoke_session_passes() {
        let source = include_str!("../../../assets/sessions/smoke.ses");
        let session = Session::parse(source).unwrap();
        let mut dev = StreamPeripheral::new();
        session.run(&mut dev).unwrap();
    }
}
