fn main() {
    if let Err(e) = logviewer::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
