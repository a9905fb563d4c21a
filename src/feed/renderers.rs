//! Region renderers
//!
//! Pure functions turning a record into an element. Keys are attached by
//! the list, not here.

use crate::view::dom::{div, p, span, Element};
use crate::view::RenderError;

use super::types::{Engagement, Post, Stage, Wallet};

/// Characters of a wallet address shown before it is cut off
const TOKEN_PREVIEW_CHARS: usize = 20;

pub fn wallet(wallet: &Wallet) -> Result<Element, RenderError> {
    if wallet.token.is_empty() {
        return Err(RenderError::new("wallet has no address"));
    }
    Ok(p().class("walletdetails").children([
        span().class("wallet").text(abbreviate(&wallet.token)),
        span()
            .class("walletbalance")
            .text(group_digits(wallet.balance)),
    ]))
}

pub fn stage(stage: &Stage) -> Result<Element, RenderError> {
    if stage.caption.is_empty() {
        return Err(RenderError::new("stage has no caption"));
    }
    Ok(p().class("stage").children([
        span().class("stageAuthor").text(format!("{}:", stage.author)),
        span().class("stageName").text(stage.caption.clone()),
        span().class("stageCount").text(stage.count.to_string()),
    ]))
}

pub fn engagement(engagement: &Engagement) -> Result<Element, RenderError> {
    if engagement.name.is_empty() {
        return Err(RenderError::new("engagement has no name"));
    }
    Ok(p().class("engagement").children([
        span().class("engagementName").text(engagement.name.clone()),
        span()
            .class("engagementCount")
            .text(engagement.count.to_string()),
    ]))
}

pub fn post(post: &Post) -> Result<Element, RenderError> {
    let class = match &post.status {
        Some(status) => format!("post {}", status),
        None => "post".to_string(),
    };

    let mut el = div().class(class).children([
        span().class("usercaption").text(post.author.clone()),
        span().class("timestamp").text(post.timestamp.clone()),
        p().class("postcontent").text(post.content.clone()),
    ]);
    if post.moderation {
        el = el.child(
            p().class("approve")
                .attr("data-approve", post.token.clone())
                .text("Approve"),
        );
    }
    Ok(el)
}

/// Shorten a wallet address for display
fn abbreviate(token: &str) -> String {
    match token.char_indices().nth(TOKEN_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &token[..cut]),
        None => token.to_string(),
    }
}

/// Format an amount with comma digit groups
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(20934), "20,934");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("0xabc"), "0xabc");
        assert_eq!(
            abbreviate("0x0123456789abcdef0123456789"),
            "0x0123456789abcdef01..."
        );
    }

    #[test]
    fn test_wallet_markup() {
        let el = wallet(&Wallet::new("0xabc", 20934)).unwrap();
        assert_eq!(
            el.to_html(),
            r#"<p class="walletdetails"><span class="wallet">0xabc</span><span class="walletbalance">20,934</span></p>"#
        );
    }

    #[test]
    fn test_wallet_without_address_fails() {
        assert!(wallet(&Wallet::new("", 1)).is_err());
    }

    #[test]
    fn test_post_markup() {
        let mut item = Post::new("p1", "Larissa", "Minha primeira resposta.").timestamp("17:34:22");
        let el = post(&item).unwrap();
        assert_eq!(el.class_name(), Some("post"));
        assert_eq!(el.child_elements().len(), 3);

        item.status = Some("pending".to_string());
        item.moderation = true;
        let el = post(&item).unwrap();
        assert_eq!(el.class_name(), Some("post pending"));
        let approve = &el.child_elements()[3];
        assert_eq!(approve.attribute("data-approve"), Some("p1"));
        assert_eq!(approve.text_content(), "Approve");
    }

    #[test]
    fn test_stage_markup() {
        let el = stage(&Stage::new("s1", "Aereum").author("ruben")).unwrap();
        assert_eq!(el.text_content(), "ruben:Aereum0");
        assert!(stage(&Stage::new("s2", "")).is_err());
    }

    #[test]
    fn test_engagement_markup() {
        let mut item = Engagement::new("s1", "Aereum");
        item.count = 3;
        let el = engagement(&item).unwrap();
        assert_eq!(el.text_content(), "Aereum3");
    }
}
