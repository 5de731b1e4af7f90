use utfstream::Scenario;

const DEFAULT_SESSION: &str = include_str!("../../../assets/sessions/smoke.ses");
const DEFAULT_FUZZ_ITERATIONS: u64 = 500;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| String::from("session"));
    let argument = args.next();

    let scenario = match command.as_str() {
        "session" => {
            let source = match &argument {
                Some(path) => {
                    log::info!("running session '{}'", path);
                    std::fs::read_to_string(path).expect("failed to read the session file")
                }
                None => {
                    log::info!("no session path given, running the bundled smoke session");
                    String::from(DEFAULT_SESSION)
                }
            };
            Scenario::Session { source }
        }
        "endian" => Scenario::Endian,
        "fuzz" => {
            let iterations = match &argument {
                Some(count) => count.parse().expect("iteration count must be a number"),
                None => DEFAULT_FUZZ_ITERATIONS,
            };
            Scenario::Fuzz { iterations }
        }
        other => {
            eprintln!("unknown command '{}', expected session, endian or fuzz", other);
            std::process::exit(1);
        }
    };

    utfstream::run(scenario).unwrap();
}
