//! End-to-end builds of a small blog.
//!
//! Each test writes a site into a temp directory, runs the library entry
//! points the CLI uses, and inspects the build directory.

use quill::config::BuildConfig;
use quill::generate::{self, BuildReport};
use quill::output;
use quill::staleness::Force;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const BASE: &str = r#"<!doctype html>
<title>{{ page.metadata.title | default(value=site.title) }}</title>
<body>
{% block content %}{% block post_content %}{% endblock post_content %}{% endblock content %}
</body>
"#;

const POST: &str = r#"{% extends "base.html" %}
{% block content %}<article>
<time>{{ page.metadata.human_readable_date }}</time>
{% block post_content %}{% endblock post_content %}
{% if page.metadata.previous is defined %}<a rel="prev" href="{{ page.metadata.previous.url }}">{{ page.metadata.previous.metadata.title }}</a>{% endif %}
{% if page.metadata.next is defined %}<a rel="next" href="{{ page.metadata.next.url }}">{{ page.metadata.next.metadata.title }}</a>{% endif %}
</article>{% endblock content %}
"#;

const INDEX: &str = r#"<ul>
{% for post in site.posts | reverse %}<li><a href="{{ post.url }}">{{ post.metadata.title }}</a></li>
{% endfor %}</ul>
{% for name, pages in site.tags %}<h2>{{ name }}</h2>{% for p in pages %}[{{ p.metadata.title }}]{% endfor %}
{% endfor %}"#;

fn blog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let files: &[(&str, &str)] = &[
        ("config.yaml", "title: Field Notes\n"),
        ("templates/base.html", BASE),
        ("templates/post.html", POST),
        ("index.html", INDEX),
        ("about.md", "---\ntitle: About\n---\nWritten by *me*.\n"),
        ("css/site.css", "body { margin: 0 }\n"),
        (
            "posts/first.md",
            "---\ntitle: First\ndate: 2020-01-05\ncategory: Programming\ntags: [rust]\nextends: post.html\n---\nOne.\n",
        ),
        (
            "posts/second.md",
            "---\ntitle: Second\ndate: 2020-02-10 08:30:00\ncategory: Programming\ntags: [rust, cli]\nextends: post.html\n---\nTwo.\n",
        ),
        (
            "posts/third.md",
            "---\ntitle: Third\ndate: 2021-03-15\ncategory: Life\nextends: post.html\n---\nThree.\n",
        ),
        (
            "posts/draft.md",
            "---\ntitle: Draft\ndate: 2021-06-01\ncategory: Life\ntags: [rust]\npublish: false\n---\nNot yet.\n",
        ),
        ("_notes/todo.md", "ignored"),
        (".editorconfig", "root = true"),
    ];
    for (path, contents) in files {
        let full = tmp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    tmp
}

fn build(root: &Path, force: &Force) -> BuildReport {
    generate::build_site(root, &BuildConfig::default(), force).unwrap()
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join("build").join(path))
        .unwrap_or_else(|e| panic!("build/{path}: {e}"))
}

fn age_sources(root: &Path, paths: &[&str]) {
    let past = SystemTime::now() - Duration::from_secs(24 * 3600);
    for path in paths {
        File::options()
            .write(true)
            .open(root.join(path))
            .unwrap()
            .set_modified(past)
            .unwrap();
    }
}

const ALL_SOURCES: &[&str] = &[
    "index.html",
    "about.md",
    "css/site.css",
    "posts/first.md",
    "posts/second.md",
    "posts/third.md",
    "posts/draft.md",
];

#[test]
fn full_build_writes_every_published_file() {
    let tmp = blog();
    let root = tmp.path();
    let report = build(root, &Force::none());

    let mut written: Vec<PathBuf> = report
        .built
        .iter()
        .map(|p| p.strip_prefix(root.join("build")).unwrap().to_path_buf())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec![
            PathBuf::from("about.html"),
            PathBuf::from("css/site.css"),
            PathBuf::from("index.html"),
            PathBuf::from("life/2021/03/15/third.html"),
            PathBuf::from("programming/2020/01/05/first.html"),
            PathBuf::from("programming/2020/02/10/second.html"),
        ]
    );
    assert_eq!(report.stats.built, 6);
    assert_eq!(report.stats.unpublished, 1);

    assert!(!root.join("build/posts").exists());
    assert!(!root.join("build/_notes").exists());
    assert!(!root.join("build/.editorconfig").exists());
    assert!(!root.join("build/templates").exists());
}

#[test]
fn markdown_pages_extend_their_base() {
    let tmp = blog();
    build(tmp.path(), &Force::none());

    let about = read(tmp.path(), "about.html");
    assert!(about.contains("<title>About</title>"), "{about}");
    assert!(about.contains("<p>Written by <em>me</em>.</p>"), "{about}");
}

#[test]
fn posts_link_to_neighbours_in_date_order() {
    let tmp = blog();
    build(tmp.path(), &Force::none());

    let second = read(tmp.path(), "programming/2020/02/10/second.html");
    assert!(second.contains("<time>10 Feb 2020</time>"), "{second}");
    assert!(second.contains("<p>Two.</p>"), "{second}");
    assert!(
        second.contains(r#"<a rel="prev" href="/programming/2020/01/05/first.html">First</a>"#),
        "{second}"
    );
    assert!(
        second.contains(r#"<a rel="next" href="/life/2021/03/15/third.html">Third</a>"#),
        "{second}"
    );

    let first = read(tmp.path(), "programming/2020/01/05/first.html");
    assert!(!first.contains("rel=\"prev\""), "{first}");

    // The unpublished draft is newer but never becomes a neighbour.
    let third = read(tmp.path(), "life/2021/03/15/third.html");
    assert!(!third.contains("rel=\"next\""), "{third}");
}

#[test]
fn index_page_sees_posts_and_tags() {
    let tmp = blog();
    build(tmp.path(), &Force::none());

    let index = read(tmp.path(), "index.html");
    let third = index.find("Third").unwrap();
    let first = index.find("First").unwrap();
    assert!(third < first, "posts listed newest first: {index}");
    assert!(index.contains("<h2>cli</h2>[Second]"), "{index}");
    assert!(index.contains("<h2>rust</h2>[First][Second]"), "{index}");
    assert!(!index.contains("Draft"), "{index}");
}

#[test]
fn assets_are_copied_unchanged() {
    let tmp = blog();
    build(tmp.path(), &Force::none());
    assert_eq!(read(tmp.path(), "css/site.css"), "body { margin: 0 }\n");
}

#[test]
fn rebuild_skips_files_that_are_up_to_date() {
    let tmp = blog();
    let root = tmp.path();
    build(root, &Force::none());
    age_sources(root, ALL_SOURCES);

    let report = build(root, &Force::none());
    assert!(report.built.is_empty(), "{:?}", report.built);
    assert_eq!(report.stats.up_to_date, 6);
    assert_eq!(report.stats.unpublished, 1);
}

#[test]
fn edited_source_is_rebuilt_alone() {
    let tmp = blog();
    let root = tmp.path();
    build(root, &Force::none());
    age_sources(root, ALL_SOURCES);

    // Touch a single source into the future relative to its output.
    let future = SystemTime::now() + Duration::from_secs(3600);
    File::options()
        .write(true)
        .open(root.join("about.md"))
        .unwrap()
        .set_modified(future)
        .unwrap();

    let report = build(root, &Force::none());
    assert_eq!(report.built, vec![root.join("build/about.html")]);
}

#[test]
fn force_all_rebuilds_everything_published() {
    let tmp = blog();
    let root = tmp.path();
    build(root, &Force::none());
    age_sources(root, ALL_SOURCES);

    let report = build(root, &Force::from_cli(root, Some(vec![])));
    assert_eq!(report.stats.built, 6);
    assert!(!root.join("build/life/2021/06/01/draft.html").exists());
    assert!(!root.join("build/posts/draft.html").exists());
}

#[test]
fn forced_files_are_rebuilt() {
    let tmp = blog();
    let root = tmp.path();
    build(root, &Force::none());
    age_sources(root, ALL_SOURCES);

    let force = Force::from_cli(root, Some(vec![PathBuf::from("posts/third.md")]));
    let report = build(root, &force);
    assert_eq!(
        report.built,
        vec![root.join("build/life/2021/03/15/third.html")]
    );
}

#[test]
fn check_reports_without_writing() {
    let tmp = blog();
    let site = generate::load_site(tmp.path(), &BuildConfig::default()).unwrap();
    let lines = output::format_check_output(&site.info);

    assert_eq!(lines[0], "Posts");
    assert_eq!(lines[1], "001 First (5 Jan 2020)");
    assert_eq!(
        lines.last().unwrap(),
        "Found 3 posts, 2 categories, 2 tags"
    );
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn reserved_site_config_key_fails_the_build() {
    let tmp = blog();
    fs::write(tmp.path().join("config.yaml"), "posts: []\n").unwrap();
    let err = generate::build_site(tmp.path(), &BuildConfig::default(), &Force::none())
        .unwrap_err();
    assert!(err.to_string().contains("posts"), "{err}");
    assert!(!tmp.path().join("build").exists());
}
