use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buf = String::new();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        if line.trim().is_empty() {
            if !buf.trim().is_empty() {
                match roll_lang::roll(&buf) {
                    Ok(results) => {
                        for result in results {
                            println!("{}", result);
                        }
                    }
                    Err(why) => eprint!("{}", why.render(&buf)),
                }
            }
            print!("> ");
            io::stdout().flush()?;
            buf.clear();
        } else {
            buf.push_str(&line);
            buf.push('\n');
            print!("... ");
            io::stdout().flush()?;
        }
    }
    Ok(())
}
