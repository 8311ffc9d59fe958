/// Modules raised to the verbose level, the library itself plus the calling binary.
fn verbose_modules(root_module: &str) -> Vec<&str> {
    let mut modules = vec![env!("CARGO_CRATE_NAME")];
    if !modules.contains(&root_module) {
        modules.push(root_module);
    }
    modules
}

/// Installs `env_logger`. `RUST_LOG` takes precedence over the defaults set here.
pub fn configure(
    root_module: &str,
    verbose: bool,
) {
    let level = if verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Debug
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    for module in verbose_modules(root_module) {
        builder.filter_module(module, level);
    }
    builder.parse_default_env().init();
}

#[cfg(test)]
mod tests {
    use super::verbose_modules;

    #[test]
    fn verbose_modules_library() {
        assert_eq!(verbose_modules("mysql_time"), vec!["mysql_time"]);
    }
    #[test]
    fn verbose_modules_binary() {
        assert_eq!(verbose_modules("mysql_time_cli"), vec!["mysql_time", "mysql_time_cli"]);
    }
}
