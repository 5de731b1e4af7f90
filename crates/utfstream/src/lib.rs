mod script;

pub use script::Session;

use anyhow::{bail, Result};
use rand::Rng;

use utfstream_core::peripheral::{flags, level, reg};
use utfstream_core::{
    Ctrl, Direction, RegisterBus, StreamPeripheral, BYTE_BUFFER_DEPTH, REGISTER_COUNT,
    UNIT_BUFFER_DEPTH,
};

/// What the driver binary was asked to do.
pub enum Scenario {
    /// Parse and replay a session script.
    Session { source: String },
    /// Walk the unit stream through both byte orders.
    Endian,
    /// Hammer the register window with random accesses and check that the
    /// advertised status stays coherent.
    Fuzz { iterations: u64 },
}

pub fn run(scenario: Scenario) -> Result<()> {
    match scenario {
        Scenario::Session { source } => run_session(&source),
        Scenario::Endian => run_endian_demo(),
        Scenario::Fuzz { iterations } => run_fuzz(iterations),
    }
}

pub fn run_session(source: &str) -> Result<()> {
    let session = Session::parse(source)?;
    let mut dev = StreamPeripheral::new();
    session.run(&mut dev)?;
    log::info!("session completed");
    Ok(())
}

/// Control value for the demo: diagnostics on, 4-byte units. The reset
/// bits are active low, so a pulse flag clears its bit.
fn ctrl_value(direction: Direction, big_endian: bool, pulse_input: bool, pulse_output: bool) -> u8 {
    let mut value = Ctrl::ERR_REPORT | Ctrl::RANGE_CHECK | Ctrl::WIDTH0 | Ctrl::WIDTH1;
    value.set(Ctrl::BIG_ENDIAN, big_endian);
    value.set(Ctrl::DIR_READ, direction == Direction::Read);
    value.set(Ctrl::IN_RESET, !pulse_input);
    value.set(Ctrl::OUT_RESET, !pulse_output);
    value.bits()
}

fn drain_units(dev: &mut StreamPeripheral, count: usize) -> Vec<u8> {
    (0..count).map(|_| dev.read_reg(reg::UNIT_DATA)).collect()
}

pub fn run_endian_demo() -> Result<()> {
    let mut dev = StreamPeripheral::new();

    log::info!("big-endian: pushing U+1F489 one byte at a time");
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Write, true, true, true));
    for value in [0x00, 0x01, 0xF4, 0x89] {
        dev.write_reg(reg::UNIT_DATA, value);
    }
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Read, true, false, false));
    let drained = drain_units(&mut dev, 4);
    log::info!("drained {:02X?}", drained);
    if drained != [0x00, 0x01, 0xF4, 0x89] {
        bail!("big-endian unit came back as {:02X?}", drained);
    }

    log::info!("big-endian partial unit: two bytes pad from the high end");
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Write, true, true, true));
    dev.write_reg(reg::UNIT_DATA, 111);
    dev.write_reg(reg::UNIT_DATA, 222);
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Read, true, false, false));
    let drained = drain_units(&mut dev, 4);
    log::info!("drained {:02X?}", drained);
    if drained != [0, 0, 111, 222] {
        bail!("padded unit came back as {:02X?}", drained);
    }

    log::info!("little-endian: the same bytes stay in arrival order");
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Write, false, true, true));
    dev.write_reg(reg::UNIT_DATA, 111);
    dev.write_reg(reg::UNIT_DATA, 222);
    dev.write_reg(reg::CTRL, ctrl_value(Direction::Read, false, false, false));
    let drained = drain_units(&mut dev, 2);
    log::info!("drained {:02X?}", drained);
    if drained != [111, 222] {
        bail!("little-endian stream came back as {:02X?}", drained);
    }

    log::info!("endian demo passed");
    Ok(())
}

pub fn run_fuzz(iterations: u64) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut dev = StreamPeripheral::new();

    for step in 0..iterations {
        let register = rng.gen_range(0..REGISTER_COUNT as u8);
        if rng.gen() {
            dev.write_reg(register, rng.gen());
        } else {
            let _ = dev.read_reg(register);
        }

        let byte_level = dev.read_reg(reg::BYTE_LEVEL);
        let unit_level = dev.read_reg(reg::UNIT_LEVEL);
        let status = dev.read_reg(reg::FLAGS);

        if (byte_level & level::COUNT_MASK) as usize > BYTE_BUFFER_DEPTH {
            bail!("step {}: byte level 0x{:02X} past capacity", step, byte_level);
        }
        if (unit_level & level::COUNT_MASK) as usize > UNIT_BUFFER_DEPTH {
            bail!("step {}: unit level 0x{:02X} past capacity", step, unit_level);
        }
        let pairs = [
            (flags::BYTE_FULL, byte_level & level::FULL),
            (flags::BYTE_EMPTY, byte_level & level::EMPTY),
            (flags::UNIT_FULL, unit_level & level::FULL),
            (flags::UNIT_EMPTY, unit_level & level::EMPTY),
        ];
        for (flag, level_bit) in pairs {
            if (status & flag != 0) != (level_bit != 0) {
                bail!(
                    "step {}: flags 0x{:02X} disagree with levels 0x{:02X}/0x{:02X}",
                    step,
                    status,
                    byte_level,
                    unit_level
                );
            }
        }

        let probe = rng.gen_range(reg::UNIT_LEVEL + 1..REGISTER_COUNT as u8);
        let reserved = dev.read_reg(probe);
        if reserved != 0 {
            bail!("step {}: reserved reg {} read 0x{:02X}", step, probe, reserved);
        }
    }

    log::info!("fuzz completed: {} operations with coherent status", iterations);
    Ok(())
}
