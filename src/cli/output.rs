//! Console output helpers for CLI handlers

pub fn print_info(message: &str) {
    println!("   {message}");
}

pub fn print_success(message: &str) {
    println!("✅ {message}");
}

pub fn print_error(message: &str) {
    eprintln!("❌ {message}");
}
