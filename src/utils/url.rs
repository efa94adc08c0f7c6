/// Build the pre-filled social-share intent URL for an article. Title and
/// URL are both percent-encoded.
pub fn share_intent_url(title: &str, url: &str) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}&url={}",
        urlencoding::encode(title),
        urlencoding::encode(url)
    )
}
