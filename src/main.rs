fn main() {
    if let Err(err) = epidash::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
