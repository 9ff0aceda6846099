//! Validates translating environment settings into acquisition settings.

use camino::Utf8PathBuf;
use rstest::rstest;
use secrecy::ExposeSecret;
use serial_test::serial;
use tailwind_tool::{
    DEFAULT_API_BASE_URL, DEFAULT_SITE_BASE_URL, Error, PlatformTarget, ToolEnvCfg,
};
use temp_env::with_vars;

const TOKEN_VARS: [(&str, Option<&str>); 3] = [
    ("TAILWIND_GITHUB_TOKEN", None),
    ("GITHUB_TOKEN", None),
    ("GH_TOKEN", None),
];

fn host_artifact() -> String {
    PlatformTarget::detect()
        .and_then(|platform| platform.artifact_name())
        .expect("tests run on a supported platform")
        .to_string()
}

#[rstest]
fn to_settings_roundtrip() -> color_eyre::Result<()> {
    let cfg = ToolEnvCfg {
        default_version: Some("v4.0.0".into()),
        binaries_dir: Some(Utf8PathBuf::from("/srv/tailwind/binaries")),
        api_base_url: Some("http://127.0.0.1:8080/repos/acme/tailwindcss".into()),
        site_base_url: Some("http://127.0.0.1:8080/acme/tailwindcss/".into()),
        github_token: Some("ghp_example".into()),
        user_agent: Some("acme-builds/2.0".into()),
    };

    let settings = cfg.to_settings()?;

    assert_eq!(settings.binaries_dir, Utf8PathBuf::from("/srv/tailwind/binaries"));
    assert_eq!(settings.artifact.as_str(), host_artifact());
    assert_eq!(
        settings.api_base_url.as_str(),
        "http://127.0.0.1:8080/repos/acme/tailwindcss/"
    );
    assert_eq!(
        settings.site_base_url.as_str(),
        "http://127.0.0.1:8080/acme/tailwindcss/"
    );
    assert_eq!(settings.user_agent, "acme-builds/2.0");
    assert_eq!(
        settings
            .github_token
            .as_ref()
            .map(|token| token.expose_secret().to_owned())
            .as_deref(),
        Some("ghp_example")
    );
    Ok(())
}

#[rstest]
#[serial]
fn default_config_uses_upstream_endpoints() {
    let settings = with_vars(TOKEN_VARS, || ToolEnvCfg::default().to_settings())
        .expect("default settings");

    assert_eq!(settings.api_base_url.as_str(), DEFAULT_API_BASE_URL);
    assert_eq!(settings.site_base_url.as_str(), DEFAULT_SITE_BASE_URL);
    assert!(settings.github_token.is_none());
    assert!(settings.binaries_dir.as_str().ends_with("binaries"));
}

#[rstest]
#[case(Some("ghp_primary"), Some("ghs_secondary"), Some("ghp_primary"))]
#[case(None, Some("ghs_secondary"), Some("ghs_secondary"))]
#[case(Some("   "), Some("ghs_secondary"), Some("ghs_secondary"))]
#[case(None, None, None)]
#[serial]
fn conventional_token_variables_are_honoured(
    #[case] github_token: Option<&str>,
    #[case] gh_token: Option<&str>,
    #[case] expected: Option<&str>,
) {
    let cfg = ToolEnvCfg::default();
    let settings = with_vars(
        [
            ("TAILWIND_GITHUB_TOKEN", None),
            ("GITHUB_TOKEN", github_token),
            ("GH_TOKEN", gh_token),
        ],
        || cfg.to_settings(),
    )
    .expect("settings");

    assert_eq!(
        settings
            .github_token
            .as_ref()
            .map(|token| token.expose_secret().to_owned())
            .as_deref(),
        expected
    );
}

#[rstest]
#[case("not a url")]
#[case("mailto:releases@example.test")]
fn invalid_base_url_is_a_config_error(#[case] raw: &str) {
    let cfg = ToolEnvCfg {
        api_base_url: Some(raw.into()),
        ..ToolEnvCfg::default()
    };

    let err = cfg.to_settings().expect_err("invalid url");

    assert!(matches!(err, Error::Config(_)), "unexpected error: {err:?}");
}

#[rstest]
#[serial]
fn load_reads_prefixed_environment() {
    let cfg = with_vars(
        [
            ("TAILWIND_DEFAULT_VERSION", Some("v3.4.17")),
            ("TAILWIND_BINARIES_DIR", Some("/var/cache/tailwind")),
            ("TAILWIND_USER_AGENT", Some("ci-runner")),
        ],
        ToolEnvCfg::load,
    )
    .expect("load configuration");

    assert_eq!(cfg.default_version.as_deref(), Some("v3.4.17"));
    assert_eq!(
        cfg.binaries_dir.as_deref().map(camino::Utf8Path::as_str),
        Some("/var/cache/tailwind")
    );
    assert_eq!(cfg.user_agent.as_deref(), Some("ci-runner"));
}
