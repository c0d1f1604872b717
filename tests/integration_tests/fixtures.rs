//! Test fixtures for integration tests
//!
//! Provides sample HTML data for sites served by mock servers

/// Single page whose title holds "dog" once and body twice
pub const DOG_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Dog</title></head>
<body><p>A dog.</p><p>My dog!</p></body>
</html>"#;

/// Page from the lemmatizer scenario
pub const CATS_AND_DOGS_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Cats and Dogs</title></head>
<body>Dogs are loyal. Cats are independent.</body>
</html>"#;

/// Russian page, served as windows-1251
pub const RUSSIAN_TEXT: &str = "Собаки громко лают во дворе";

pub const RUSSIAN_TITLE: &str = "Собаки";

/// Unclosed tags and stray markup
pub const MALFORMED_HTML: &str = r#"<html><head><title>Broken page</title>
<body><div><p>Parrots talk<div>Parrots <b>fly</p></span>"#;

/// Russian page encoded as windows-1251
pub fn russian_page_bytes() -> Vec<u8> {
    let html = format!(
        "<html><head><title>{RUSSIAN_TITLE}</title></head><body><p>{RUSSIAN_TEXT}</p></body></html>"
    );
    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(&html);
    bytes.into_owned()
}
