//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bookinfo_core::fetch::{FetchError, Fetcher};
use url::Url;

/// Detail page for ISBN 9787544258609 with every labelled field present.
pub const DETAIL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>白夜行</title></head>
<body>
<div class="book-title"><h1> 白夜行 </h1></div>
<div class="book-details">
  <p class="price">定价：<span class="num">¥39.80</span></p>
  <table>
    <tr><td>作　者：</td><td>东野圭吾 著，刘姿君 译</td></tr>
    <tr><td>出版社：</td><td><a href="/publisher/nanhai/">南海出版公司</a></td></tr>
    <tr><td>丛编项：</td><td>新经典文库</td></tr>
    <tr><td>标　签：</td><td>小说,推理</td></tr>
    <tr><td>ISBN：</td><td>9787544258609</td></tr>
    <tr><td>出版时间：</td><td>2013-01-01</td></tr>
    <tr><td>包装：</td><td>平装</td></tr>
    <tr><td>开本：</td><td>32开</td></tr>
    <tr><td>页数：</td><td>467</td></tr>
    <tr><td>字数：</td><td>&nbsp;</td></tr>
  </table>
</div>
<div class="book-summary">
  <h4>内容简介</h4>
  <div><div class="text">雪穗&amp;亮司的故事。</div></div>
  <h4>作者简介</h4>
  <div><div class="text">东野圭吾，日本作家。</div></div>
  <h4>图书目录</h4>
  <div><div class="text">第一章</div></div>
</div>
</body>
</html>"#;

/// Search page whose first result links to `href`.
#[must_use]
pub fn search_page(href: &str) -> String {
    format!(
        r#"<html><body>
<div class="book-info"><h3><a href="{href}">白夜行</a></h3></div>
<div class="book-info"><h3><a href="/book/99999999/">白夜行（精装）</a></h3></div>
</body></html>"#
    )
}

/// Search page with no results.
pub const EMPTY_SEARCH_PAGE: &str =
    r#"<html><body><div class="search-result">没有找到相关图书</div></body></html>"#;

/// Fetcher that never reaches the network: every call is counted and fails.
#[derive(Debug, Default, Clone)]
pub struct CountingFetcher {
    calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::http_status(url.as_str(), 503))
    }
}
