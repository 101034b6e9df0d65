// src/backend/utils/log.rs
// Canister log lines. Native builds (tests) have no debug_print, so they go to stderr.

fn emit(line: String) {
    #[cfg(target_arch = "wasm32")]
    ic_cdk::print(line);
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", line);
}

pub fn info(msg: impl AsRef<str>) {
    emit(format!("📝 INFO: {}", msg.as_ref()));
}

pub fn warn(msg: impl AsRef<str>) {
    emit(format!("⚠️ WARNING: {}", msg.as_ref()));
}

pub fn error(msg: impl AsRef<str>) {
    emit(format!("❌ ERROR: {}", msg.as_ref()));
}
