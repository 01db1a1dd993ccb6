use dotenvy::dotenv_iter;

/// Bake `IPCHECK_*` values from a local `.env` file in as compile-time
/// defaults; runtime environment variables still take precedence.
fn main() {
    println!("cargo:rerun-if-changed=.env");

    let Ok(entries) = dotenv_iter() else {
        return;
    };

    for (k, v) in entries.flatten() {
        if k.starts_with("IPCHECK_") {
            println!("cargo:rustc-env={k}={v}");
        }
    }
}
