use super::*;

fn bold(text: &str) -> Span {
    Span {
        text: text.into(),
        style: SpanStyle {
            bold: true,
            ..SpanStyle::default()
        },
    }
}

fn plain(text: &str) -> Span {
    Span {
        text: text.into(),
        style: SpanStyle::default(),
    }
}

#[test]
fn bold_delimiters_become_strong() {
    let rendered = render_bot_text("**Total:** 42");
    assert_eq!(rendered.html, "<strong>Total:</strong> 42");
    assert_eq!(rendered.spans, vec![bold("Total:"), plain(" 42")]);
    assert_eq!(rendered.plain_text(), "Total: 42");
}

#[test]
fn substitutions_run_in_fixed_order() {
    let rendered = render_bot_text("*a* and `b`\n```\nlet x = 1;\n```");
    assert_eq!(
        rendered.html,
        "<em>a</em> and <code>b</code><br><pre><code><br>let x = 1;<br></code></pre>"
    );

    // Emphasis runs before code detection, so markers inside a fence are still converted.
    let rendered = render_bot_text("```**x**```");
    assert_eq!(rendered.html, "<pre><code><strong>x</strong></code></pre>");
    let style = rendered.spans[0].style;
    assert!(style.bold && style.code && style.code_block);
}

#[test]
fn newlines_become_line_breaks_in_spans() {
    let rendered = render_bot_text("one\ntwo");
    assert_eq!(rendered.html, "one<br>two");
    assert_eq!(rendered.spans, vec![plain("one\ntwo")]);
}

#[test]
fn hostile_markup_is_escaped_before_substitution() {
    let rendered = render_bot_text("<script>alert('x')</script> **ok**");
    assert_eq!(
        rendered.html,
        "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; <strong>ok</strong>"
    );
    assert_eq!(
        rendered.spans,
        vec![plain("<script>alert('x')</script> "), bold("ok")]
    );
}

#[test]
fn crossing_emphasis_does_not_leak_style() {
    let rendered = render_bot_text("**a *b** c* d");
    assert_eq!(rendered.html, "<strong>a <em>b</strong> c</em> d");
    let last = rendered.spans.last().expect("spans");
    assert_eq!(last, &plain(" d"));
}

#[test]
fn plain_entries_are_escaped_but_not_transformed() {
    let rendered = render_plain_text("use **stars** & <tags>\nhere");
    assert_eq!(
        rendered.html,
        "use **stars** &amp; &lt;tags&gt;\nhere"
    );
    assert_eq!(rendered.spans, vec![plain("use **stars** & <tags>\nhere")]);
    assert!(render_plain_text("").spans.is_empty());
}
