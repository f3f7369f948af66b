// Extraction behaviour on realistic obituary pages

use obit_feed_scraper::{ContentBlock, ContentExtractor, ContentFragment, ExtractionOutcome};

const FUNERAL_HOME_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Robert "Bob" Miller | Lakeside Funeral Home</title>
</head>
<body>
  <header><nav><a href="/">Home</a><a href="/obituaries">Obituaries</a></nav></header>
  <main>
    <article>
      <div data-blog-component="subtitle">
        <h3>
          Robert "Bob" Miller
        </h3>
      </div>
      <div data-blog-component="image">
        <figure><img src="https://cdn.lakeside.example/miller.jpg" alt="Bob"></figure>
      </div>
      <div data-blog-component="share"><a href="#">Share</a></div>
      <div data-blog-component="text">
        <div data-blog-inner="text"><p>Bob loved fishing &amp; his grandchildren.</p><p>Services Saturday.</p></div>
      </div>
      <div data-blog-component="subtitle"><h4>Service Details</h4></div>
    </article>
  </main>
  <footer>© Lakeside Funeral Home</footer>
</body>
</html>"##;

fn content(outcome: ExtractionOutcome) -> ContentFragment {
    match outcome {
        ExtractionOutcome::Content(fragment) => fragment,
        other => panic!("expected content, got {:?}", other),
    }
}

#[test]
fn test_jane_doe_scenario() {
    let html = r#"<div data-blog-component="subtitle"><h3>Jane Doe</h3></div><div data-blog-component="image"><img src="http://x/a.jpg"></div>"#;
    let fragment = content(ContentExtractor::default().extract(html));
    assert_eq!(
        fragment.block_markup(),
        vec!["<h3>Jane Doe</h3>", r#"<img src="http://x/a.jpg" alt="obit image" />"#]
    );
}

#[test]
fn test_funeral_home_page_blocks() {
    let fragment = content(ContentExtractor::default().extract(FUNERAL_HOME_PAGE));

    assert_eq!(
        fragment.blocks(),
        &[
            ContentBlock::Subtitle {
                tag: "h3".to_string(),
                text: "Robert \"Bob\" Miller".to_string(),
            },
            ContentBlock::Image {
                src: "https://cdn.lakeside.example/miller.jpg".to_string(),
            },
            ContentBlock::Text {
                html: "<div data-blog-inner=\"text\"><p>Bob loved fishing &amp; his grandchildren.</p><p>Services Saturday.</p></div>".to_string(),
            },
            ContentBlock::Subtitle {
                tag: "h4".to_string(),
                text: "Service Details".to_string(),
            },
        ]
    );
}

#[test]
fn test_fragment_markup_is_newline_joined() {
    let fragment = content(ContentExtractor::default().extract(FUNERAL_HOME_PAGE));
    let markup = fragment.to_markup();
    assert_eq!(markup.lines().count(), 4);
    assert!(markup.starts_with("<h3>Robert \"Bob\" Miller</h3>\n<img "));
    assert!(markup.ends_with("<h4>Service Details</h4>"));
}

#[test]
fn test_challenge_banner_any_case() {
    for banner in ["Are You Human?", "ARE YOU HUMAN", "are you human"] {
        let html = format!(
            "<html><body><div class=\"banner\">{banner}</div>{FUNERAL_HOME_PAGE}</body></html>"
        );
        assert_eq!(
            ContentExtractor::default().extract(&html),
            ExtractionOutcome::Blocked,
            "banner {banner:?} not detected"
        );
    }
}

#[test]
fn test_phrase_in_obituary_text_beyond_window() {
    let html = FUNERAL_HOME_PAGE.replace(
        "Services Saturday.",
        "He often asked strangers: are you human or a fish?",
    );
    assert!(html.find("are you human").unwrap() > 500);

    let default = ContentExtractor::default();
    assert!(matches!(default.extract(&html), ExtractionOutcome::Content(_)));

    let whole_page = ContentExtractor::new(None);
    assert_eq!(whole_page.extract(&html), ExtractionOutcome::Blocked);
}

#[test]
fn test_garbage_markup_does_not_fail() {
    let extractor = ContentExtractor::default();
    for html in ["", "<<<>>>", "<div data-blog-component=\"text\"><div data-blog-inner=\"text\">unclosed", "\u{0}\u{1}binary"] {
        assert!(matches!(extractor.extract(html), ExtractionOutcome::Content(_)));
    }
}

#[test]
fn test_unclosed_text_block_still_extracted() {
    let html = "<div data-blog-component=\"text\"><div data-blog-inner=\"text\"><p>unclosed";
    let fragment = content(ContentExtractor::default().extract(html));
    assert_eq!(
        fragment.block_markup(),
        vec!["<div data-blog-inner=\"text\"><p>unclosed</p></div>"]
    );
}
