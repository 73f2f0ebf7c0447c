/// 将显示名转换为可用作本地文件名的字符串（也会替换路径分隔符）
pub fn safe_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' | '\\' | ':' | '%' | '$' => out.push('_'),
            '?' | '!' | '*' | ' ' => out.push('-'),
            '|' | '"' | '<' | '>' => {}
            _ => out.push(c),
        }
    }
    // Windows 文件名不能以点结尾
    if cfg!(windows) && out.ends_with('.') {
        out.pop();
    }
    out
}
