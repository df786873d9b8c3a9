use doushu_scrape::parse_page;

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn parses_a_real_collect_page() {
    let html = load_fixture("collect_page.html");
    let page = parse_page(&html);

    assert_eq!(page.items_seen, 3);
    assert_eq!(page.records.len(), 3);

    let huozhe = &page.records[0];
    assert_eq!(huozhe.title, "活着");
    assert_eq!(huozhe.url, "https://book.douban.com/subject/1082154/");
    assert_eq!(huozhe.author, "余华");
    assert_eq!(huozhe.publisher, "作家出版社");
    assert_eq!(huozhe.publish_date, "2012-08-01");
    assert_eq!(huozhe.rating, "5分");
    assert_eq!(huozhe.review, "好书，一口气读完。");
    assert_eq!(huozhe.date, "2023-04-05");

    let xiaowangzi = &page.records[1];
    assert_eq!(xiaowangzi.author, "[法] 圣埃克苏佩里");
    assert_eq!(xiaowangzi.publisher, "人民文学出版社");
    assert_eq!(xiaowangzi.publish_date, "2003-08-01");
    assert_eq!(xiaowangzi.rating, "3分");

    let santi = &page.records[2];
    assert_eq!(santi.rating, "未评分");
    assert_eq!(santi.review, "");
    assert_eq!(santi.date, "2021-06-18");
}
