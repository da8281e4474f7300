use smallvec::SmallVec;

/// パスのセグメント列
/// 8個までならヒープを使わない
pub type Segments<'a> = SmallVec<[&'a str; 8]>;

/// クエリとフラグメントを取り除いたパス部分を返す
/// 例: "/api/v1/user?id=123#top" -> "/api/v1/user"
#[inline]
pub fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// パスを `/` で分割する
/// 先頭・末尾・連続した `/` による空セグメントは除去する
#[inline]
pub fn split_segments(path: &str) -> Segments<'_> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
