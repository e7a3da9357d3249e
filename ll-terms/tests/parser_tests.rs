use ll_terms::grammar::{NonTerminal, Symbol};
use ll_terms::{ParseError, TermParser, TermStore, TokenKind, View, parse};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn leaves() {
    init_logger();
    assert_eq!(parse("foo").unwrap().view(), View::Atom("foo"));
    assert_eq!(parse("42").unwrap().view(), View::Number("42"));
    assert_eq!(parse("X").unwrap().view(), View::Variable("X"));
}

#[test]
fn compound_with_mixed_args() {
    init_logger();
    let t = parse("foo(1, a, bar(X))").unwrap();
    let store = t.store();
    assert_eq!(store.functor_name(t.root()).unwrap(), "foo");
    assert_eq!(store.arity(t.root()).unwrap(), 3);
    let bar_x = store.args(t.root()).unwrap()[2];
    assert_eq!(store.functor_name(bar_x).unwrap(), "bar");
    assert_eq!(store.display(bar_x).to_string(), "bar(X)");
}

#[test]
fn identical_subterms_share_one_node() {
    let t = parse("f(g(X), g(X))").unwrap();
    let args = t.store().args(t.root()).unwrap();
    assert_eq!(args[0], args[1]);
}

#[test]
fn empty_and_unterminated_inputs_fail() {
    let ParseError::Syntax(e) = parse("").unwrap_err() else {
        panic!("expected syntax error");
    };
    assert_eq!(e.expected, Symbol::Nonterminal(NonTerminal::Start));
    assert_eq!(e.found.kind, TokenKind::End);

    let e = parse("foo(").unwrap_err();
    assert!(e.is_syntax());
    assert_eq!(e.found(), Some(TokenKind::End));
}

#[test]
fn bad_character_fails_lexing() {
    let e = parse("foo(@)").unwrap_err();
    assert!(e.is_lexical());
    assert!(e.to_string().contains("'@'"));
}

#[test]
fn canonical_text_reparses_to_equal_term() {
    for input in ["p", "f(X,  Y)", "'a b'('C', -1.25)", "g(h(i(j(k))))"] {
        let t = parse(input).unwrap();
        assert_eq!(parse(&t.to_string()).unwrap(), t);
    }
}

#[test]
fn builders_and_parser_agree() {
    let mut parser = TermParser::new();
    let mut store = TermStore::new();
    let f = store.atom("f");
    let x = store.variable("X").unwrap();
    let one = store.number("1").unwrap();
    let built = store.compound(f, &[x, one]).unwrap();
    let parsed = parser.parse_into(&mut store, "f(X, 1)").unwrap();
    assert_eq!(built, parsed);
    assert_eq!(store.len(), 4);
}

#[test]
fn failure_keeps_shared_store_intact() {
    let mut parser = TermParser::new();
    let mut store = TermStore::new();
    parser.parse_into(&mut store, "keep(me)").unwrap();
    let len = store.len();
    assert!(parser.parse_into(&mut store, "drop(new, stuff").is_err());
    assert_eq!(store.len(), len);
}
