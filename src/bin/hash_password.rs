//! 生成后台口令的 bcrypt 哈希, 用于
//! `ADMIN_VIEWER_PASSWORD_HASH` / `ADMIN_EDITOR_PASSWORD_HASH`。

use spin_wheel_backend::{AppResult, utils::{hash_password, validate_password}};

fn run(password: &str) -> AppResult<String> {
    validate_password(password)?;
    hash_password(password)
}

fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("usage: hash-password <password>");
        std::process::exit(2);
    };

    match run(&password) {
        Ok(hash) => println!("{hash}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
