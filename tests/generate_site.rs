//! Generate the demo site from its fixture documents

use std::fs;
use std::path::Path;

use spacetraveling::generator::GenerateSummary;
use spacetraveling::Site;

fn demo_site(dir: &Path) -> Site {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    for file in ["_config.yml", "posts.json"] {
        fs::copy(demos.join(file), dir.join(file)).unwrap();
    }
    Site::new(dir).unwrap()
}

fn read(site: &Site, path: &str) -> String {
    fs::read_to_string(site.public_dir.join(path)).unwrap()
}

#[tokio::test]
async fn generates_listing_and_post_pages() {
    let dir = tempfile::tempdir().unwrap();
    let site = demo_site(dir.path());

    let summary = site.generate().await.unwrap();
    assert_eq!(
        summary,
        GenerateSummary {
            listing_pages: 2,
            post_pages: 3
        }
    );

    let index = read(&site, "index.html");
    assert!(index.contains("Como utilizar Hooks"));
    assert!(index.contains("Criando um app CRA do zero"));
    assert!(!index.contains("Mapas com React"));
    assert!(index.contains("15 mar 2021"));
    assert!(index.contains("Carregar mais posts"));

    let page2 = read(&site, "page/2/index.html");
    assert!(page2.contains("Como utilizar Hooks"));
    assert!(page2.contains("Mapas com React usando Leaflet"));
    assert!(page2.contains("data desconhecida"));
    assert!(!page2.contains("Carregar mais posts"));
    assert!(!page2.contains("Not a post"));

    let hooks = read(&site, "post/como-utilizar-hooks/index.html");
    assert!(hooks.contains("2 min"));
    assert!(hooks.contains("<strong>Lorem ipsum</strong>"));
    assert!(hooks.contains("Proin et varius"));

    let cra = read(&site, "post/criando-um-app-cra-do-zero/index.html");
    assert!(cra.contains("1 min"));
    assert!(cra.contains(r#"<a href="https://nodejs.org">node</a>"#));

    let maps = read(&site, "post/mapas-com-react-usando-leaflet/index.html");
    assert!(maps.contains("0 min"));

    assert!(site.public_dir.join("404.html").exists());
    assert!(!site.public_dir.join("post/home").exists());
}

#[tokio::test]
async fn clean_removes_generated_output() {
    let dir = tempfile::tempdir().unwrap();
    let site = demo_site(dir.path());

    site.generate().await.unwrap();
    assert!(site.public_dir.join("index.html").exists());

    site.clean().unwrap();
    assert!(!site.public_dir.exists());
}
