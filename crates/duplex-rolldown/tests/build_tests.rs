//! End-to-end builds of a small project through Rolldown.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use duplex_config::{PartialServerConfig, UserOptions};
use duplex_core::host::HostBuild;
use duplex_core::{BuildMode, BuilderOptions, ReentrancyFlag, plugins_for};
use duplex_rolldown::{HostError, RolldownHost, top_level_config};
use serde_json::json;
use tempfile::TempDir;

fn create_project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("server")).unwrap();
    fs::create_dir_all(root.join("public")).unwrap();

    fs::write(
        root.join("index.html"),
        r#"<!doctype html>
<html>
  <body>
    <div id="app"></div>
    <script type="module" src="/src/main.js"></script>
  </body>
</html>
"#,
    )
    .unwrap();
    fs::write(
        root.join("src/main.js"),
        "import { greet } from './greet.js';\ndocument.getElementById('app').textContent = greet('client');\n",
    )
    .unwrap();
    fs::write(
        root.join("src/greet.js"),
        "export function greet(name) { return `hello ${name}`; }\n",
    )
    .unwrap();
    fs::write(
        root.join("server/main.js"),
        "import { greet } from '../src/greet.js';\nconsole.log(greet('server'), __SERVER__);\n",
    )
    .unwrap();
    fs::write(root.join("public/robots.txt"), "User-agent: *\n").unwrap();
    dir
}

fn host(root: &Path, options: BuilderOptions) -> Arc<RolldownHost> {
    let plan = options.resolve().expect("valid options");
    RolldownHost::new(root, plugins_for(Arc::new(plan), ReentrancyFlag::isolated()))
}

fn files_under(dir: &Path) -> Vec<String> {
    walk(dir, dir)
}

fn walk(base: &Path, dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(walk(base, &path));
        } else {
            files.push(path.strip_prefix(base).unwrap().to_string_lossy().replace('\\', "/"));
        }
    }
    files.sort();
    files
}

#[tokio::test]
async fn server_first_build_writes_both_bundles() {
    let project = create_project();
    let root = project.path();
    let options = BuilderOptions::from_options(
        serde_json::from_value::<UserOptions>(json!({
            "server_entry": "server/main.js",
            "server_config": { "define": { "__SERVER__": true } }
        }))
        .unwrap(),
    );
    let host = host(root, options);

    host.build(top_level_config()).await.expect("build succeeds");

    let server = fs::read_to_string(root.join("dist/app.js")).expect("server bundle");
    assert!(server.contains("hello"));
    assert!(!server.contains("__SERVER__"));

    let client_files = files_under(&root.join("dist/public"));
    assert!(client_files.contains(&"index.html".to_string()), "{client_files:?}");
    assert!(client_files.contains(&"robots.txt".to_string()), "{client_files:?}");
    let main_chunk = client_files
        .iter()
        .find(|f| f.starts_with("assets/main-") && f.ends_with(".js"))
        .expect("client entry chunk");

    let page = fs::read_to_string(root.join("dist/public/index.html")).unwrap();
    assert!(page.contains(&format!("src=\"/{main_chunk}\"")), "{page}");
    assert!(!page.contains("/src/main.js"));

    // the diverted outer build writes nothing of its own
    assert!(!root.join("dist/index.html").exists());
}

#[tokio::test]
async fn skip_mode_runs_the_plain_build() {
    let project = create_project();
    let root = project.path();
    let host = host(root, BuilderOptions::new("server/main.js").mode(BuildMode::Skip));

    host.build(top_level_config()).await.expect("build succeeds");

    assert!(root.join("dist/index.html").exists());
    assert!(!root.join("dist/app.js").exists());
    assert!(!root.join("dist/public").exists());
}

#[tokio::test]
async fn custom_server_out_dir() {
    let project = create_project();
    let root = project.path();
    let options = BuilderOptions::new("server/main.js")
        .server_config(PartialServerConfig {
            out_dir: Some("build/server".into()),
            define: Some([("__SERVER__".to_string(), json!(false))].into_iter().collect()),
            ..Default::default()
        })
        .client_config(duplex_config::PartialClientConfig {
            out_dir: Some("build/client".into()),
            ..Default::default()
        });
    let host = host(root, options);

    host.build(top_level_config()).await.expect("build succeeds");

    assert!(root.join("build/server/app.js").exists());
    assert!(root.join("build/client/index.html").exists());
    assert!(!root.join("dist").exists());
}

#[tokio::test]
async fn hook_moving_out_dir_to_root_keeps_sources() {
    let project = create_project();
    let root = project.path();
    let options = BuilderOptions::new("server/main.js").server_build(|mut config| {
        config.build.out_dir = ".".into();
        config
    });
    let host = host(root, options);

    let err = host.build(top_level_config()).await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<HostError>(),
            Some(HostError::UnsafeOutDir { .. })
        ),
        "{err:#}"
    );

    assert!(root.join("index.html").exists());
    assert!(root.join("src/main.js").exists());
    assert!(root.join("server/main.js").exists());
}

#[tokio::test]
async fn out_dir_outside_root_is_refused() {
    let project = create_project();
    let root = project.path();
    let sibling = TempDir::new().expect("temp dir");
    fs::write(sibling.path().join("keep.txt"), "mine").unwrap();

    let target = sibling.path().to_path_buf();
    let options = BuilderOptions::new("server/main.js").client_build(move |mut config| {
        config.build.out_dir = target.clone();
        config
    });
    let host = host(root, options);

    assert!(host.build(top_level_config()).await.is_err());
    assert_eq!(fs::read_to_string(sibling.path().join("keep.txt")).unwrap(), "mine");
}
