use owo_colors::OwoColorize;

pub fn print_banner() {
    let banner = r#"
   ___                 _
  / __|___ _  _ _ _ _(_)___ _ _
 | (__/ _ \ || | '_| | / -_) '_|
  \___\___/\_,_|_| |_|_\___|_|

    WhatsApp Business Relay
"#;
    println!("{}", banner.bright_green());
}
