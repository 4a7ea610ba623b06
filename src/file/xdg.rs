//! XDG Base Directory の解決
//!
//! `$XDG_*_HOME/<app>` が設定されていればそれを、無ければホーム配下の既定を使う。

use std::ffi::OsString;
use std::path::PathBuf;

/// ユーザーデータディレクトリ（`~/.local/share/<app>`）
pub fn user_data_dir(app_name: &str) -> PathBuf {
    resolve(
        std::env::var_os("XDG_DATA_HOME"),
        dirs::home_dir(),
        &[".local", "share"],
        app_name,
    )
}

/// ユーザー設定ディレクトリ（`~/.config/<app>`）
pub fn user_config_dir(app_name: &str) -> PathBuf {
    resolve(
        std::env::var_os("XDG_CONFIG_HOME"),
        dirs::home_dir(),
        &[".config"],
        app_name,
    )
}

/// ユーザーキャッシュディレクトリ（`~/.cache/<app>`）
pub fn user_cache_dir(app_name: &str) -> PathBuf {
    resolve(
        std::env::var_os("XDG_CACHE_HOME"),
        dirs::home_dir(),
        &[".cache"],
        app_name,
    )
}

/// データ・設定・キャッシュの各ディレクトリを作成
pub fn ensure_directories_exist(app_name: &str) -> std::io::Result<()> {
    for dir in [
        user_data_dir(app_name),
        user_config_dir(app_name),
        user_cache_dir(app_name),
    ] {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

fn resolve(
    env_value: Option<OsString>,
    home: Option<PathBuf>,
    fallback: &[&str],
    app_name: &str,
) -> PathBuf {
    // 空文字の環境変数は未設定扱い
    if let Some(base) = env_value.filter(|v| !v.is_empty()) {
        return PathBuf::from(base).join(app_name);
    }

    let mut path = home.unwrap_or_else(|| PathBuf::from("."));
    for part in fallback {
        path.push(part);
    }
    path.join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_takes_precedence() {
        let path = resolve(
            Some(OsString::from("/tmp/xdg-data")),
            Some(PathBuf::from("/home/user")),
            &[".local", "share"],
            "mfatext",
        );
        assert_eq!(path, PathBuf::from("/tmp/xdg-data/mfatext"));
    }

    #[test]
    fn falls_back_to_home() {
        let path = resolve(None, Some(PathBuf::from("/home/user")), &[".config"], "mfatext");
        assert_eq!(path, PathBuf::from("/home/user/.config/mfatext"));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let path = resolve(
            Some(OsString::new()),
            Some(PathBuf::from("/home/user")),
            &[".cache"],
            "mfatext",
        );
        assert_eq!(path, PathBuf::from("/home/user/.cache/mfatext"));
    }
}
