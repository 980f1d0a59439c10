use super::*;

const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15";
const IPHONE_CHROME: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/126.0 Mobile/15E148 Safari/604.1";
const ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";
const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

#[test]
fn safari_detection_matches_browser_families() {
    assert!(!is_safari(CHROME_WIN));
    assert!(is_safari(SAFARI_MAC));
    assert!(is_safari(IPHONE_CHROME));
    assert!(!is_safari(ANDROID));
    assert!(!is_safari(FIREFOX));
}

#[test]
fn ios_detection_is_by_device_token() {
    assert!(is_ios(IPHONE_CHROME));
    assert!(is_ios("Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X)"));
    assert!(!is_ios(SAFARI_MAC));
    assert!(!is_ios(ANDROID));
}

#[test]
fn capabilities_from_user_agent() {
    assert_eq!(
        PlatformCapabilities::from_user_agent(CHROME_WIN),
        PlatformCapabilities::desktop()
    );
    assert_eq!(
        PlatformCapabilities::from_user_agent(FIREFOX),
        PlatformCapabilities::desktop()
    );

    let ios = PlatformCapabilities::from_user_agent(IPHONE_CHROME);
    assert!(!ios.supports_direct_download);
    assert!(ios.supports_share_sheet);

    let mac = PlatformCapabilities::from_user_agent(SAFARI_MAC);
    assert!(!mac.supports_direct_download);
}
