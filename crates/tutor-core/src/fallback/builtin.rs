//! Built-in curated algebra questions.

use crate::quiz::QuizItem;

fn item(question: &str, options: [&str; 4], correct: &str, explanation: &str) -> QuizItem {
    QuizItem {
        question: question.to_string(),
        options: ["A", "B", "C", "D"]
            .into_iter()
            .zip(options)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        correct: correct.to_string(),
        explanation: explanation.to_string(),
        topic: String::new(),
    }
}

fn linear_equations() -> Vec<QuizItem> {
    vec![
        item(
            "Solve for x: 2x + 5 = 13",
            ["x = 3", "x = 4", "x = 5", "x = 6"],
            "B",
            "Subtract 5 from both sides: 2x = 8. Then divide by 2: x = 4.",
        ),
        item(
            "What is the solution to: 3x - 7 = 14?",
            ["x = 5", "x = 6", "x = 7", "x = 8"],
            "C",
            "Add 7 to both sides: 3x = 21. Then divide by 3: x = 7.",
        ),
        item(
            "Solve for x: 5x + 2 = 3x + 10",
            ["x = 2", "x = 3", "x = 4", "x = 6"],
            "C",
            "Subtract 3x from both sides: 2x + 2 = 10. Subtract 2: 2x = 8. Divide by 2: x = 4.",
        ),
        item(
            "Solve for x: 4(x - 3) = 20",
            ["x = 2", "x = 5", "x = 6", "x = 8"],
            "D",
            "Divide both sides by 4: x - 3 = 5. Then add 3: x = 8.",
        ),
    ]
}

fn quadratic_equations() -> Vec<QuizItem> {
    vec![
        item(
            "What are the solutions to x² - 5x + 6 = 0?",
            ["x = 1, 6", "x = 2, 3", "x = -2, -3", "x = 1, 5"],
            "B",
            "Factor to (x - 2)(x - 3) = 0. Solutions are x = 2 and x = 3.",
        ),
        item(
            "Solve: x² = 49",
            ["x = 7", "x = -7", "x = ±7", "x = 24.5"],
            "C",
            "Take the square root of both sides and keep both signs: x = 7 or x = -7.",
        ),
    ]
}

fn polynomials() -> Vec<QuizItem> {
    vec![
        item(
            "Simplify: (2x + 3)(x - 4)",
            ["2x² - 5x - 12", "2x² - 8x - 12", "2x² + 5x + 12", "2x² + 11x - 12"],
            "A",
            "Use FOIL: 2x² - 8x + 3x - 12 = 2x² - 5x - 12.",
        ),
        item(
            "Simplify: (3x² + 2x - 1) + (x² - 4x + 5)",
            ["4x² + 2x + 4", "4x² - 2x + 4", "3x² - 2x + 4", "4x² - 2x - 6"],
            "B",
            "Combine like terms: 3x² + x² = 4x², 2x - 4x = -2x, -1 + 5 = 4.",
        ),
    ]
}

fn factoring() -> Vec<QuizItem> {
    vec![
        item(
            "Factor: x² + 7x + 12",
            ["(x + 3)(x + 4)", "(x + 2)(x + 6)", "(x + 1)(x + 12)", "(x - 3)(x - 4)"],
            "A",
            "Find two numbers that multiply to 12 and add to 7: 3 and 4. So (x + 3)(x + 4).",
        ),
        item(
            "Factor: x² - 9",
            ["(x - 3)²", "(x - 9)(x + 1)", "(x - 3)(x + 3)", "(x + 3)²"],
            "C",
            "x² - 9 is a difference of squares: a² - b² = (a - b)(a + b) with a = x, b = 3.",
        ),
    ]
}

pub(super) fn entries() -> Vec<(String, Vec<QuizItem>)> {
    vec![
        ("linear_equations".to_string(), linear_equations()),
        ("quadratic_equations".to_string(), quadratic_equations()),
        ("polynomials".to_string(), polynomials()),
        ("factoring".to_string(), factoring()),
    ]
}
