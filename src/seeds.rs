//! Built-in question bank so the quiz is playable without config or OpenAI.

use crate::domain::{Category, QuestionBody, QuestionDraft};

fn mc(category: Category, question: &str, options: [&str; 4], correct_index: usize) -> QuestionDraft {
  QuestionDraft {
    category,
    question: question.into(),
    body: QuestionBody::MultipleChoice {
      options: options.iter().map(|s| s.to_string()).collect(),
      correct_index,
    },
  }
}

fn blank(category: Category, question: &str, answers: &[&str], hints: &[&str]) -> QuestionDraft {
  QuestionDraft {
    category,
    question: question.into(),
    body: QuestionBody::FillBlank {
      accepted_answers: answers.iter().map(|s| s.to_string()).collect(),
      hints: hints.iter().map(|s| s.to_string()).collect(),
    },
  }
}

pub fn seed_questions() -> Vec<QuestionDraft> {
  use Category::*;
  vec![
    mc(General, "대한민국의 수도는?", ["서울", "부산", "대구", "인천"], 0),
    mc(General, "가장 높은 산은?", ["백두산", "에베레스트산", "후지산", "킬리만자로"], 1),
    mc(General, "태양계에서 가장 큰 행성은?", ["지구", "목성", "토성", "화성"], 1),
    mc(General, "한국의 통화는?", ["엔", "달러", "원", "위안"], 2),
    mc(General, "세계에서 가장 긴 강은?", ["아마존강", "나일강", "양쯔강", "미시시피강"], 1),
    mc(General, "올림픽이 처음 개최된 나라는?", ["이탈리아", "프랑스", "그리스", "영국"], 2),
    mc(General, "컴퓨터의 뇌 역할을 하는 부품은?", ["RAM", "CPU", "GPU", "SSD"], 1),
    mc(General, "인간의 뼈는 몇 개인가?", ["206개", "198개", "215개", "224개"], 0),
    mc(General, "지구의 자전 주기는?", ["12시간", "24시간", "48시간", "72시간"], 1),
    mc(General, "한글을 창제한 왕은?", ["세종대왕", "태종", "정조", "영조"], 0),
    blank(General, "대한민국의 수도는 ______ 이다.", &["서울", "Seoul", "서울특별시"], &["한강이 흐릅니다", "인구가 가장 많은 도시입니다"]),
    blank(General, "무지개는 보통 ______ 가지 색으로 나타낸다.", &["7", "일곱", "칠"], &["한 주의 요일 수와 같습니다"]),

    mc(History, "조선왕조는 몇 년간 지속되었나?", ["392년", "418년", "456년", "518년"], 3),
    mc(History, "제2차 세계대전이 끝난 해는?", ["1944년", "1945년", "1946년", "1947년"], 1),
    mc(History, "고구려를 건국한 인물은?", ["온조", "주몽", "박혁거세", "김수로"], 1),
    mc(History, "프랑스 혁명이 일어난 해는?", ["1789년", "1799년", "1804년", "1815년"], 0),
    mc(History, "한국 전쟁이 발발한 해는?", ["1948년", "1949년", "1950년", "1951년"], 2),
    mc(History, "이집트 피라미드가 있는 도시는?", ["카이로", "기자", "룩소르", "알렉산드리아"], 1),
    mc(History, "몽골 제국을 건설한 인물은?", ["쿠빌라이 칸", "칭기즈 칸", "바투 칸", "오고타이 칸"], 1),
    mc(History, "로마 제국이 동서로 분할된 해는?", ["365년", "395년", "476년", "527년"], 1),
    mc(History, "임진왜란이 시작된 해는?", ["1590년", "1592년", "1594년", "1596년"], 1),
    mc(History, "미국 독립선언서가 발표된 해는?", ["1774년", "1775년", "1776년", "1777년"], 2),
    blank(History, "훈민정음을 반포한 조선의 왕은 ______ 이다.", &["세종대왕", "세종", "King Sejong"], &["조선의 네 번째 왕입니다", "만 원권 지폐의 인물입니다"]),
    blank(History, "임진왜란 때 거북선을 이끈 장군은 ______ 이다.", &["이순신", "Yi Sun-sin"], &["한산도 대첩", "백 원 동전의 인물입니다"]),

    mc(Science, "물의 화학식은?", ["H2O", "CO2", "NaCl", "CH4"], 0),
    mc(Science, "빛의 속도는 약 얼마인가?", ["30만km/s", "25만km/s", "35만km/s", "40만km/s"], 0),
    mc(Science, "인체에서 가장 큰 장기는?", ["심장", "폐", "간", "피부"], 3),
    mc(Science, "원자의 중심에 있는 것은?", ["전자", "양성자", "중성자", "원자핵"], 3),
    mc(Science, "DNA의 이중나선 구조를 발견한 과학자는?", ["다윈", "멘델", "왓슨과 크릭", "파스퇴르"], 2),
    mc(Science, "지구의 대기 중 가장 많은 기체는?", ["산소", "질소", "이산화탄소", "수소"], 1),
    mc(Science, "전류의 단위는?", ["와트", "볼트", "암페어", "옴"], 2),
    mc(Science, "소리가 전달되지 않는 곳은?", ["진공", "공기", "물", "고체"], 0),
    mc(Science, "혈액의 적혈구 수명은?", ["30일", "60일", "90일", "120일"], 3),
    mc(Science, "뉴턴의 운동 법칙은 몇 개인가?", ["2개", "3개", "4개", "5개"], 1),
    blank(Science, "물의 화학식은 ______ 이다.", &["H2O"], &["수소 원자 두 개와 산소 원자 하나"]),
    blank(Science, "식물이 빛을 이용해 양분을 만드는 과정을 ______ 이라고 한다.", &["광합성", "photosynthesis"], &["엽록체에서 일어납니다", "이산화탄소와 물을 사용합니다"]),
  ]
}
