//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::path::PathBuf;

    use webpify::config::{load_options, FileConfig};
    use webpify::core::{replace, Document};

    use crate::common::Site;

    #[test]
    fn file_options_drive_replace() {
        let site = Site::new();
        let path = site.write(
            "webpify.toml",
            r#"
image_types = ["png", ".GIF"]
ignore_attr = "data-keep"
"#,
        );
        let options = load_options(Some(path.as_path())).unwrap();
        let document = Document::new(
            "index.html",
            r#"<img src="a.gif"><img src="b.png" data-keep><img src="c.jpg">"#,
        );

        let output = replace(&document, &options).unwrap();
        assert_eq!(
            String::from_utf8(output.document).unwrap(),
            r#"<img data-src="a.gif" data-webp-src="a.webp" class="j-webp"><img src="b.png" data-keep><img src="c.jpg">"#
        );
    }

    #[test]
    fn tilde_in_paths_is_expanded() {
        let mut options = webpify::core::WebpOptions::default();
        FileConfig::from_toml("source_root = \"~/site\"\n")
            .unwrap()
            .apply(&mut options);

        assert!(!options.source_root.starts_with("~"));
        assert!(options.source_root.ends_with("site"));
        assert_ne!(options.source_root, PathBuf::from("~/site"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use webpify::config::load_options;
    use webpify::core::WebpError;

    use crate::common::Site;

    #[test]
    fn malformed_toml() {
        let site = Site::new();
        let path = site.write("webpify.toml", "class_name = \n");

        assert!(matches!(
            load_options(Some(path.as_path())),
            Err(WebpError::Toml(_))
        ));
    }

    #[test]
    fn empty_class_name() {
        let site = Site::new();
        let path = site.write("webpify.toml", "class_name = \"\"\n");

        assert!(matches!(
            load_options(Some(path.as_path())),
            Err(WebpError::Config(_))
        ));
    }
}
