//! 标签文本操作的公共函数

/// 把标签拆成主体和结束符（`/>` 或 `>`）
///
/// 没有结束符的片段原样作为主体返回，结束符为空。
pub fn split_closing(tag: &str) -> (&str, &str) {
    if let Some(body) = tag.strip_suffix("/>") {
        (body, "/>")
    } else if let Some(body) = tag.strip_suffix('>') {
        (body, ">")
    } else {
        (tag, "")
    }
}

/// 转义写入双引号属性值时冲突的引号
///
/// 值取自原文属性，实体已经是编码后的形式，`&` 保持不变。
pub fn escape_attr_value(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// 在结束符之前追加 `name="value"`，与前面的内容之间保留一个空格
///
/// 结束符前原有的空白（如 `<img src="a" />`）保持在新属性之后。
pub fn append_attr(tag: &str, name: &str, value: &str) -> String {
    let (body, closing) = split_closing(tag);
    let trimmed = body.trim_end();
    let trailing = &body[trimmed.len()..];

    format!(
        "{} {}=\"{}\"{}{}",
        trimmed,
        name,
        escape_attr_value(value),
        trailing,
        closing
    )
}
