use std::process;

fn main() {
    match checklists_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("checklists error: {err:#}");
            process::exit(1);
        }
    }
}
