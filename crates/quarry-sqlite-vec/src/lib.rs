//! Registers sqlite-vec as a SQLite auto-extension.
//!
//! Once registered, every connection opened by the process exposes the
//! `vec_*` SQL functions (`vec_version`, `vec_f32`, `vec_distance_cosine`),
//! which `quarry-search` uses for the KNN fast path. Registration is
//! process-wide and happens at most once; the result is cached.
//!
//! Set `QUARRY_SQLITE_VEC_AUTO=0` to opt out, in which case semantic search
//! falls back to a pure-Rust cosine scan.

use std::sync::OnceLock;

const AUTO_ENABLE_ENV: &str = "QUARRY_SQLITE_VEC_AUTO";

static REGISTRATION: OnceLock<Result<(), String>> = OnceLock::new();

/// Register sqlite-vec for all future connections in this process.
///
/// # Errors
///
/// Returns a message when registration is disabled via the environment or
/// when SQLite rejects the extension entrypoint.
pub fn register_auto_extension() -> Result<(), String> {
    if matches!(
        std::env::var(AUTO_ENABLE_ENV).ok().as_deref(),
        Some("0" | "false" | "off")
    ) {
        return Err(format!(
            "sqlite-vec auto-extension disabled by {AUTO_ENABLE_ENV}"
        ));
    }

    REGISTRATION.get_or_init(register_once).clone()
}

fn register_once() -> Result<(), String> {
    // sqlite3_auto_extension expects the generic xEntryPoint signature;
    // sqlite-vec exports its init with concrete pointer types, so the cast
    // below is the documented way to adapt it.
    #[allow(clippy::transmute_ptr_to_ptr)]
    let entrypoint: unsafe extern "C" fn(
        *mut rusqlite::ffi::sqlite3,
        *mut *const std::os::raw::c_char,
        *const rusqlite::ffi::sqlite3_api_routines,
    ) -> std::os::raw::c_int =
        unsafe { std::mem::transmute(sqlite_vec::sqlite3_vec_init as *const ()) };

    let rc = unsafe { rusqlite::ffi::sqlite3_auto_extension(Some(entrypoint)) };
    if rc == rusqlite::ffi::SQLITE_OK {
        Ok(())
    } else {
        Err(format!("sqlite3_auto_extension failed with rc={rc}"))
    }
}
