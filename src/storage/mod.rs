//! Report persistence.
//!
//! A report is the sorted character inventory followed by the fixed
//! [`SYMBOL_TABLE`], UTF-8 encoded with no separators and no trailing newline.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Punctuation, symbols, and Latin letters and digits (full and half width)
/// appended to every report regardless of what was crawled.
pub const SYMBOL_TABLE: &str = "、。，．・：；？！゛゜´｀¨＾￣＿ヽヾゝゞ〃仝々〆〇ー―‐／＼～∥｜…‥‘’“”（）〔〕［］｛｝〈〉《》「」『』【】＋－±×÷＝≠＜＞≦≧∞∴♂♀°′″℃￥＄￠￡％＃＆＊＠§☆★○●◎◇◆□■△▲▽▼※〒→←↑↓Å‰♯♭♪─│｡｢｣､①②③④⑤⑥⑦⑧⑨⑩⑪⑫⑬⑭⑮⑯⑰⑱⑲⑳ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩ㍉㌔㌢㍍㌘㌧㌃㌶㍑㍗㌍㌦㌣㌫㍊㌻㎜㎝㎞㎎㎏㏄㎡㍻〝〟№㏍℡㊤㊥㊦㊧㊨㈱㈲㈹㍾㍽㍼ＡＢＣＤＥＦＧＨＩＪＫＬＭＮＯＰＱＲＳＴＵＶＷＸＹＺａｂｃｄｅｆｇｈｉｊｋｌｍｎｏｐｑｒｓｔｕｖｗｘｙｚ０１２３４５６７８９abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 !\"#$%&'()-^\\@[;:],./\\=~|`{+*}<>?_";

/// Render the report body.
pub fn render_report(characters: &[char], symbol_table: &str) -> String {
    let mut report = String::with_capacity(characters.len() * 3 + symbol_table.len());
    report.extend(characters.iter());
    report.push_str(symbol_table);
    report
}

/// Trait for report storage backends.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Write the characters followed by `symbol_table`, replacing any
    /// existing report.
    async fn write_report(&self, characters: &[char], symbol_table: &str) -> Result<()>;
}
