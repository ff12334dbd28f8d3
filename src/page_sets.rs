use anyhow::{Context, Result};
use url::Url;

/// User agent class a page set is recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentType {
    Desktop,
    Mobile,
}

/// Predefined collection of pages used as benchmark input.
#[derive(Debug)]
pub struct PageSet {
    /// Registry key (e.g. `top_25_smooth`).
    pub name: &'static str,
    /// Name the page set is referred to by in benchmark listings.
    pub label: &'static str,
    pub description: &'static str,
    pub user_agent: UserAgentType,
    /// Recorded archive the pages are replayed from.
    pub archive_data_file: &'static str,
    pub pages: &'static [&'static str],
}

impl PageSet {
    /// Parse every page of the set, failing on the first malformed entry.
    pub fn urls(&self) -> Result<Vec<Url>> {
        self.pages
            .iter()
            .map(|page| {
                Url::parse(page)
                    .with_context(|| format!("Page set {} contains malformed URL {page}", self.name))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

pub static TOP_25_SMOOTH: PageSet = PageSet {
    name: "top_25_smooth",
    label: "Top25SmoothPageSet",
    description: "Pages hand-picked from the top 25 sites, replayed for smoothness work.",
    user_agent: UserAgentType::Desktop,
    archive_data_file: "data/top_25.json",
    pages: &[
        "https://www.google.com/#hl=en&q=barack+obama",
        "https://mail.google.com/mail/",
        "https://www.google.com/calendar/",
        "https://www.google.com/search?q=cats&tbm=isch",
        "https://docs.google.com/document/d/1X-IKNjtEnx-WW5JIKRLsyhz5sbsat3mfTpAPUSX3_s4/view",
        "https://plus.google.com/110031535020051778989/posts",
        "https://www.youtube.com",
        "http://googlewebmaster.blogspot.com/",
        "http://en.blog.wordpress.com/",
        "http://www.facebook.com/barackobama",
        "http://www.linkedin.com/in/linustorvalds",
        "http://en.wikipedia.org/wiki/Wikipedia",
        "https://twitter.com/katyperry",
        "http://pinterest.com",
        "http://espn.go.com",
        "http://news.yahoo.com",
        "http://www.cnn.com",
        "http://www.weather.com/weather/right-now/Mountain+View+CA+94043",
        "http://www.amazon.com",
        "http://www.ebay.com",
        "http://games.yahoo.com",
        "http://booking.com",
        "http://answers.yahoo.com",
        "http://sports.yahoo.com/",
        "http://techcrunch.com",
    ],
};

pub static KEY_MOBILE_SITES: PageSet = PageSet {
    name: "key_mobile_sites",
    label: "KeyMobileSitesPageSet",
    description: "Key mobile sites with smooth interactions.",
    user_agent: UserAgentType::Mobile,
    archive_data_file: "data/key_mobile_sites.json",
    pages: &[
        "http://www.techcrunch.com",
        "http://www.nytimes.com",
        "https://mobile.twitter.com/justinbieber?skip_interstitial=true",
        "http://www.wikipedia.org/",
        "http://m.espn.go.com/nhl/rankings",
        "http://www.zillow.com/",
        "http://www.baidu.com/s?wd=barack+obama",
        "http://www.amazon.com/",
        "http://m.facebook.com/barackobama",
        "http://www.cnn.com/",
        "http://m.youtube.com/watch?v=9hBpF_Zj4OA",
        "http://www.google.com/search?q=sale",
        "http://m.ebay.com/",
        "http://www.yahoo.com/",
        "http://en.m.wikipedia.org/wiki/Main_Page",
        "http://www.reddit.com/r/programming/comments/1g96ve",
    ],
};

pub static KEY_SILK_CASES: PageSet = PageSet {
    name: "key_silk_cases",
    label: "KeySilkCasesPageSet",
    description: "Pages hand-picked for project Silk.",
    user_agent: UserAgentType::Mobile,
    archive_data_file: "data/key_silk_cases.json",
    pages: &[
        "http://groupcloned.com/test/plain/list-recycle-transform.html",
        "http://groupcloned.com/test/plain/sticky-using-webkit-backface-visibility.html",
        "http://groupcloned.com/test/plain/mobile-fb-news-feed.html",
        "http://jsbin.com/UVIgUTa/6/quiet",
        "file://key_silk_cases/font_wipe.html",
        "file://key_silk_cases/inbox_app.html?swipe_to_dismiss",
        "file://key_silk_cases/inbox_app.html?stress_hidey_bars",
        "file://key_silk_cases/infinite_scrolling.html",
        "file://key_silk_cases/pull_to_refresh.html",
        "file://key_silk_cases/card_expansion.html",
        "file://key_silk_cases/old_ios_scroller.html",
        "file://key_silk_cases/flexbox_scrolling.html",
    ],
};

pub static POLYMER: PageSet = PageSet {
    name: "polymer",
    label: "PolymerPageSet",
    description: "Pages hand-picked for Polymer testing.",
    user_agent: UserAgentType::Mobile,
    archive_data_file: "data/polymer.json",
    pages: &[
        "http://www.polymer-project.org/components/paper-calculator/demo.html",
        "http://www.polymer-project.org/components/paper-shadow/demo.html",
        "http://www.polymer-project.org/components/paper-button/demo.html",
        "http://www.polymer-project.org/components/paper-tabs/demo.html",
    ],
};

static PAGE_SETS: [&PageSet; 4] = [&TOP_25_SMOOTH, &KEY_MOBILE_SITES, &KEY_SILK_CASES, &POLYMER];

pub fn page_sets() -> &'static [&'static PageSet] {
    &PAGE_SETS
}

/// Look up a page set by registry key or label, ignoring case.
pub fn find_page_set(name: &str) -> Option<&'static PageSet> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }
    page_sets().iter().copied().find(|set| {
        set.name.eq_ignore_ascii_case(needle) || set.label.eq_ignore_ascii_case(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_parses_as_url() {
        for set in page_sets() {
            let urls = set.urls().expect("valid urls");
            assert_eq!(urls.len(), set.len(), "{}", set.name);
            assert!(!set.is_empty());
        }
    }

    #[test]
    fn top_25_has_twenty_five_pages() {
        assert_eq!(TOP_25_SMOOTH.len(), 25);
    }

    #[test]
    fn lookup_accepts_key_and_label() {
        let by_key = find_page_set("polymer").expect("polymer");
        let by_label = find_page_set("KeySilkCasesPageSet").expect("silk");
        assert!(std::ptr::eq(by_key, &POLYMER));
        assert!(std::ptr::eq(by_label, &KEY_SILK_CASES));
        assert!(find_page_set("  ").is_none());
        assert!(find_page_set("tough_canvas_cases").is_none());
    }
}
