//! Built-in daily messages
//!
//! Inserted once, in a single transaction, when the messages collection is
//! empty. These are the non-custom messages that users can favorite but not
//! edit or delete.

use super::models::{MessageCategory, NewMessage};
use chrono::{DateTime, Utc};

const DEFAULT_MESSAGES: &[(MessageCategory, &str)] = &[
    (MessageCategory::Reason, "I love how your smile lights up the entire room when you're genuinely happy."),
    (MessageCategory::Reason, "Your kindness to strangers shows me the beautiful person you are inside."),
    (MessageCategory::Reason, "The way you laugh at your own jokes before the punchline makes me fall for you all over again."),
    (MessageCategory::Reason, "I love how passionate you are about the things you care about."),
    (MessageCategory::Reason, "Your strength and resilience inspire me every single day."),
    (MessageCategory::Reason, "The little dance you do when you're excited is the cutest thing I've ever seen."),
    (MessageCategory::Reason, "I love how you always see the best in people, even when it's hard to find."),
    (MessageCategory::Reason, "Your intelligence and the way you think about the world fascinates me."),
    (MessageCategory::Reason, "The sound of your voice is my favorite sound in the whole world."),
    (MessageCategory::Reason, "I love how you're not afraid to be yourself, always and completely."),
    (MessageCategory::Reason, "Your creativity amazes me - you see beauty and possibility everywhere."),
    (MessageCategory::Reason, "The way you care for others without expecting anything in return shows your beautiful soul."),
    (MessageCategory::Reason, "I love your sense of humor and how you can make me laugh even on my worst days."),
    (MessageCategory::Reason, "Your eyes sparkle when you talk about your dreams, and it makes me want to help you achieve every single one."),
    (MessageCategory::Reason, "I love how comfortable silence feels when I'm with you."),
    (MessageCategory::Reason, "The way you scrunch your nose when you're confused is adorable beyond words."),
    (MessageCategory::Reason, "Your determination and work ethic push me to be a better person."),
    (MessageCategory::Reason, "I love how you remember the little things I tell you."),
    (MessageCategory::Reason, "Your gentle heart and the way you care for everything around you is beautiful."),
    (MessageCategory::Reason, "The way you support my dreams makes me feel like I can conquer anything."),
    (MessageCategory::Memory, "Remember our first date? I was so nervous, but you made everything feel easy and natural."),
    (MessageCategory::Memory, "That time we got lost on our road trip and ended up finding that amazing little cafe - best detour ever."),
    (MessageCategory::Memory, "I'll never forget the first time you said 'I love you' - my heart still skips a beat thinking about it."),
    (MessageCategory::Memory, "Dancing in the kitchen at midnight while making late-night snacks is one of my favorite memories."),
    (MessageCategory::Memory, "The way you held my hand during that scary movie - I felt so safe with you."),
    (MessageCategory::Memory, "Remember when we stayed up all night just talking? I could listen to you forever."),
    (MessageCategory::Memory, "That sunset we watched together - the view was beautiful, but I couldn't stop looking at you."),
    (MessageCategory::Memory, "The first time you met my family and charmed everyone without even trying."),
    (MessageCategory::Memory, "That rainy day we spent inside playing games and laughing - perfection doesn't need sunshine."),
    (MessageCategory::Memory, "Remember our first kiss? Time stopped, and in that moment, I knew you were special."),
    (MessageCategory::Memory, "The way you surprised me on my birthday showed me how well you truly know me."),
    (MessageCategory::Memory, "That time we tried to cook together and made a complete mess but laughed the entire time."),
    (MessageCategory::Memory, "Walking hand in hand through the park, no destination, just us and endless conversation."),
    (MessageCategory::Memory, "The first morning I woke up next to you - I never wanted that moment to end."),
    (MessageCategory::Memory, "Remember when we stayed in bed all day just being lazy together? Those are the moments I treasure."),
    (MessageCategory::Memory, "That inside joke that still makes us laugh no matter how many times we repeat it."),
    (MessageCategory::Memory, "The way you comforted me when I was going through a tough time - I'll never forget your support."),
    (MessageCategory::Memory, "Our spontaneous adventure to that place we'd never been - every moment with you is an adventure."),
    (MessageCategory::Memory, "The day we decided to be 'us' - best decision I ever made."),
    (MessageCategory::Memory, "Remember how nervous we both were at the beginning? Look how far we've come."),
    (MessageCategory::Affirmation, "You are beautiful, inside and out, and don't let anyone tell you otherwise."),
    (MessageCategory::Affirmation, "You are stronger than you know, braver than you believe, and more amazing than you realize."),
    (MessageCategory::Affirmation, "Your worth is not determined by anyone else's opinion - you are inherently valuable."),
    (MessageCategory::Affirmation, "Today, remember that you are capable of achieving anything you set your mind to."),
    (MessageCategory::Affirmation, "You deserve all the love and happiness in the world."),
    (MessageCategory::Affirmation, "Your dreams are valid, your goals are achievable, and your potential is limitless."),
    (MessageCategory::Affirmation, "You make the world a better place just by being in it."),
    (MessageCategory::Affirmation, "It's okay to rest - you don't have to be perfect all the time."),
    (MessageCategory::Affirmation, "You are loved more than you know, especially by me."),
    (MessageCategory::Affirmation, "Your feelings are valid, your thoughts matter, and your voice deserves to be heard."),
    (MessageCategory::Affirmation, "You are enough, exactly as you are, right now."),
    (MessageCategory::Affirmation, "The way you handle challenges shows incredible strength and grace."),
    (MessageCategory::Affirmation, "You have a gift for making others feel special and appreciated."),
    (MessageCategory::Affirmation, "Today is another opportunity to be the amazing person you already are."),
    (MessageCategory::Affirmation, "You bring joy and light to everyone around you, especially me."),
    (MessageCategory::Affirmation, "Your kindness is a superpower that changes lives, including mine."),
    (MessageCategory::Affirmation, "You are doing better than you think, and I'm so proud of you."),
    (MessageCategory::Affirmation, "The world needs your unique talents and perspective."),
    (MessageCategory::Affirmation, "You have the courage to face whatever comes your way."),
    (MessageCategory::Affirmation, "Remember: you are loved, you are valued, and you are irreplaceable."),
    (MessageCategory::Future, "I can't wait to wake up next to you every morning for the rest of our lives."),
    (MessageCategory::Future, "Someday we'll look back on these days as 'the beginning' of our beautiful story."),
    (MessageCategory::Future, "I'm excited to build a life with you, filled with love, laughter, and adventure."),
    (MessageCategory::Future, "I can't wait to travel the world with you and create memories in every corner of the globe."),
    (MessageCategory::Future, "Growing old with you is my favorite future to imagine."),
    (MessageCategory::Future, "I look forward to all the ordinary moments we'll share - they're extraordinary with you."),
    (MessageCategory::Future, "One day we'll have our own place, our own traditions, our own little world together."),
    (MessageCategory::Future, "I can't wait to support all your dreams and watch you achieve everything you want."),
    (MessageCategory::Future, "Someday we'll sit on our porch and laugh about all the adventures we've had together."),
    (MessageCategory::Future, "I'm excited for every sunrise we'll watch together and every sunset we'll share."),
    (MessageCategory::Future, "All the plans we're making, all the dreams we're building - I want it all with you."),
    (MessageCategory::Future, "I can't wait for all the holidays, birthdays, and special moments we'll celebrate together."),
    (MessageCategory::Future, "Looking forward to a lifetime of inside jokes that nobody else understands."),
    (MessageCategory::Future, "I want to be by your side through every season of life, supporting each other always."),
    (MessageCategory::Future, "Imagine all the stories we'll have to tell someday about our life together."),
    (MessageCategory::Future, "I'm excited for lazy Sunday mornings with coffee and you for the rest of forever."),
    (MessageCategory::Future, "Can't wait to build a home together - not just a house, but a place filled with our love."),
    (MessageCategory::Future, "Every tomorrow is brighter because I know you'll be in it."),
    (MessageCategory::Future, "I look forward to dancing in the kitchen with you when we're old and grey."),
    (MessageCategory::Future, "All my future plans include you - you're my forever."),
    (MessageCategory::Affirmation, "Good morning, beautiful! Today is another day to be amazing, and you already are."),
    (MessageCategory::Reason, "Just a reminder that you're on my mind today and always. Hope you're smiling right now because that's my favorite thing."),
    (MessageCategory::Reason, "You're the first person I think of when I wake up and the last one on my mind before I sleep."),
    (MessageCategory::Affirmation, "Thank you for being you - imperfectly perfect and absolutely wonderful."),
    (MessageCategory::Affirmation, "If I could give you one thing, it would be the ability to see yourself through my eyes. Then you'd realize how truly special you are."),
    (MessageCategory::Reason, "You are my sunshine on cloudy days, my calm in the storm, my home."),
    (MessageCategory::Reason, "Every love song makes sense now because I have you."),
    (MessageCategory::Reason, "I never knew I was missing anything until I found everything in you."),
    (MessageCategory::Reason, "You're not just my girlfriend - you're my best friend, my confidant, my everything."),
    (MessageCategory::Future, "Life with you is an adventure I never want to end."),
    (MessageCategory::Reason, "You make ordinary moments feel magical just by being there."),
    (MessageCategory::Memory, "Thank you for loving me on my bad days and celebrating with me on my good days."),
    (MessageCategory::Reason, "With you, I'm home. No matter where we are."),
    (MessageCategory::Affirmation, "You've changed my life in the best possible way, and I'm grateful every day."),
    (MessageCategory::Reason, "Your love makes me want to be the best version of myself."),
    (MessageCategory::Reason, "I love you not only for what you are but for what I am when I'm with you."),
    (MessageCategory::Reason, "You're the answer to questions I didn't even know I was asking."),
    (MessageCategory::Memory, "Every day with you is my new favorite day."),
    (MessageCategory::Reason, "You're proof that soulmates exist."),
    (MessageCategory::Future, "I love you more than yesterday, less than tomorrow, and that will never change."),
];

/// Seed messages stamped with `now`
pub fn default_messages(now: DateTime<Utc>) -> Vec<NewMessage> {
    DEFAULT_MESSAGES
        .iter()
        .map(|(category, text)| NewMessage {
            text: (*text).to_string(),
            category: *category,
            is_custom: false,
            active: true,
            is_favorite: false,
            created_at: now,
            updated_at: None,
            tags: Vec::new(),
        })
        .collect()
}
