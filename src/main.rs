use env_logger::{Builder, Env};

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — warn (stdout занят выводом команд).
    // Пример: RUST_LOG=debug ./kvdb add a.db ! key value
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();
    std::process::exit(kvdb::cli::main_exit_code());
}
