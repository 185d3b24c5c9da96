fn main() {
    if let Err(err) = skald::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
