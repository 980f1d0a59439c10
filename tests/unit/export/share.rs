use super::*;

fn campaign() -> Campaign {
    Campaign {
        slug: "hut-ri-80".to_string(),
        name: "HUT RI 80".to_string(),
        description: None,
    }
}

#[test]
fn uri_component_encoding() {
    assert_eq!(encode_uri_component("abc-_.!~*'()"), "abc-_.!~*'()");
    assert_eq!(encode_uri_component("a b&c=d/e?"), "a%20b%26c%3Dd%2Fe%3F");
    assert_eq!(encode_uri_component("é"), "%C3%A9");
}

#[test]
fn whatsapp_combines_text_and_url() {
    let intent = share_intent(ShareTarget::Whatsapp, &campaign(), "https://frame.id");
    assert_eq!(
        intent,
        ShareIntent::OpenUrl(
            "https://wa.me/?text=Check%20out%20this%20awesome%20twibbon%3A%20HUT%20RI%2080%20https%3A%2F%2Fframe.id%2Ftwibbon%2Fhut-ri-80"
                .to_string()
        )
    );
}

#[test]
fn facebook_and_twitter_intents() {
    let c = campaign();
    assert_eq!(
        share_intent(ShareTarget::Facebook, &c, "https://frame.id"),
        ShareIntent::OpenUrl(
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fframe.id%2Ftwibbon%2Fhut-ri-80"
                .to_string()
        )
    );
    let ShareIntent::OpenUrl(tw) = share_intent(ShareTarget::Twitter, &c, "https://frame.id")
    else {
        panic!("twitter should open a url");
    };
    assert!(tw.starts_with("https://twitter.com/intent/tweet?text=Check%20out"));
    assert!(tw.ends_with("&url=https%3A%2F%2Fframe.id%2Ftwibbon%2Fhut-ri-80"));
}

#[test]
fn instagram_copies_the_link() {
    assert_eq!(
        share_intent(ShareTarget::Instagram, &campaign(), "https://frame.id/"),
        ShareIntent::CopyLink("https://frame.id/twibbon/hut-ri-80".to_string())
    );
}

#[test]
fn targets_parse_case_insensitively() {
    assert_eq!("WhatsApp".parse::<ShareTarget>().unwrap(), ShareTarget::Whatsapp);
    assert!("myspace".parse::<ShareTarget>().is_err());
}
