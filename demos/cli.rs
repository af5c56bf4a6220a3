use env_logger::Env;
use std::io::Read;
use stepsolve::SolveResult;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .init();

    // either the problem is passed as arguments, or it comes from stdin
    let args: Vec<String> = std::env::args().skip(1).collect();
    let problem = if args.is_empty() {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        args.join(" ")
    };

    match stepsolve::solve(&problem) {
        Ok(SolveResult::Evaluate { value }) => println!("Result: {}", value),
        Ok(SolveResult::System {
            solution,
            system_repr,
        }) => {
            println!("Interpreted as:");
            for equation in &system_repr {
                println!("  {}", equation);
            }

            println!("Found:");
            for (name, value) in &solution {
                println!("  {} = {}", name, value);
            }
        },
        Ok(other) => print!("{}", other),
        Err(e) => {
            eprintln!("Unable to solve \"{}\": {}", problem.trim(), e);
            std::process::exit(1);
        },
    }

    Ok(())
}
