fn main() {
    if let Err(e) = time_capsule_lib::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
